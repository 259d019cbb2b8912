use serde::{Deserialize, Serialize};

/// Step id the strategy request reads the company size answer from.
pub const STEP_SIZE: &str = "size";
/// Step id the strategy request reads the bottleneck answer from.
pub const STEP_BOTTLENECK: &str = "bottleneck";
/// Step id the strategy request reads the tech stack answers from.
pub const STEP_TECH: &str = "tech";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    Multi,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    pub label: String,
    pub value: String,
}

impl StepOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

/// Static wizard step configuration. Immutable for the process lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStep {
    pub id: String,
    pub prompt: String,
    pub mode: SelectionMode,
    pub options: Vec<StepOption>,
}

impl QuestionStep {
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        mode: SelectionMode,
        options: Vec<StepOption>,
    ) -> Self {
        Self { id: id.into(), prompt: prompt.into(), mode, options }
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }
}

/// The three production question steps.
pub fn default_steps() -> Vec<QuestionStep> {
    vec![
        QuestionStep::new(
            STEP_SIZE,
            "How large is your organization?",
            SelectionMode::Single,
            vec![
                StepOption::new("1–10 Employees", "1-10"),
                StepOption::new("10–50 Employees", "10-50"),
                StepOption::new("50–200 Employees", "50-200"),
                StepOption::new("200+ Employees", "200+"),
            ],
        ),
        QuestionStep::new(
            STEP_BOTTLENECK,
            "What is your primary operational bottleneck?",
            SelectionMode::Single,
            vec![
                StepOption::new("Manual Data Entry", "data-entry"),
                StepOption::new("Slow Sales Process", "sales"),
                StepOption::new("Customer Support Overload", "support"),
                StepOption::new("Reporting Chaos", "reporting"),
                StepOption::new("Tool Fragmentation", "fragmentation"),
            ],
        ),
        QuestionStep::new(
            STEP_TECH,
            "Which tools do you currently use? (Select all that apply)",
            SelectionMode::Multi,
            vec![
                StepOption::new("HubSpot", "hubspot"),
                StepOption::new("Slack", "slack"),
                StepOption::new("Airtable", "airtable"),
                StepOption::new("Notion", "notion"),
                StepOption::new("Shopify", "shopify"),
                StepOption::new("Custom / Other", "custom"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_steps_end_with_a_multi_step() {
        let steps = default_steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps.last().map(|step| step.mode), Some(SelectionMode::Multi));
    }

    #[test]
    fn option_membership_checks_values_not_labels() {
        let steps = default_steps();
        let size = &steps[0];
        assert!(size.has_option("10-50"));
        assert!(!size.has_option("10–50 Employees"));
    }
}
