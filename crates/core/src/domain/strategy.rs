//! Strategy submission and recommendation types.
//!
//! The recommendation shape is a convention the oracle does not enforce, so
//! [`Recommendation`] keeps every field optional and tolerates wrong-typed
//! fields instead of failing the whole value.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::DomainError;
use crate::wizard::steps::{STEP_BOTTLENECK, STEP_SIZE, STEP_TECH};
use crate::wizard::{Answer, Answers};

/// A completed wizard submission as it crosses the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub company_size: String,
    pub bottleneck: String,
    #[serde(deserialize_with = "lenient_string_seq")]
    pub tech_stack: Vec<String>,
}

impl StrategyRequest {
    /// Assemble a request from the wizard's answers snapshot.
    pub fn from_answers(answers: &Answers) -> Self {
        let single = |id: &str| {
            answers.get(id).and_then(Answer::single).map(str::to_owned).unwrap_or_default()
        };
        let tech_stack = answers
            .get(STEP_TECH)
            .and_then(Answer::multi)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        Self {
            name: None,
            email: None,
            company_size: single(STEP_SIZE),
            bottleneck: single(STEP_BOTTLENECK),
            tech_stack,
        }
    }

    /// Both `companySize` and `bottleneck` must be present and non-empty.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.company_size.trim().is_empty() || self.bottleneck.trim().is_empty() {
            return Err(DomainError::MissingRequiredFields(
                "companySize and bottleneck".to_string(),
            ));
        }
        Ok(())
    }
}

/// `techStack` must be a sequence of strings; anything else is treated as
/// empty rather than rejecting the submission.
fn lenient_string_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(entry) => Some(entry),
            _ => None,
        })
        .collect())
}

/// Structured automation strategy as rendered to the user.
///
/// Week labels sort lexicographically (`week1`..`week4`), which matches the
/// order the oracle is instructed to emit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendation {
    pub diagnosis: Option<String>,
    pub system: Option<String>,
    pub hours_saved: Option<String>,
    pub timeline: Option<String>,
    pub plan: Option<BTreeMap<String, String>>,
    pub next_step: Option<String>,
}

impl Recommendation {
    /// Tolerant projection of untrusted oracle output: absent or wrong-typed
    /// fields become `None` instead of failing the value.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
        let plan = value.get("plan").and_then(Value::as_object).map(|weeks| {
            weeks
                .iter()
                .filter_map(|(week, deliverable)| {
                    deliverable.as_str().map(|text| (week.clone(), text.to_owned()))
                })
                .collect::<BTreeMap<String, String>>()
        });

        Self {
            diagnosis: text("diagnosis"),
            system: text("system"),
            hours_saved: text("hoursSaved"),
            timeline: text("timeline"),
            plan,
            next_step: text("nextStep"),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
