//! Wizard state machine for the strategy assistant.
//!
//! State lives in a plain [`WizardState`] value and only changes through the
//! named operations on [`Wizard`]. Rendering is a pure projection of the
//! state ([`Wizard::render_mode`]), so a driver (terminal, HTTP client) holds
//! no view state of its own.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::wizard::steps::{default_steps, QuestionStep, SelectionMode};

/// Accumulated answers keyed by step id.
pub type Answers = BTreeMap<String, Answer>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Single(String),
    Multi(Vec<String>),
}

impl Answer {
    pub fn single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multi(_) => None,
        }
    }

    pub fn multi(&self) -> Option<&[String]> {
        match self {
            Self::Single(_) => None,
            Self::Multi(values) => Some(values),
        }
    }
}

/// One browser-session's worth of wizard progress.
///
/// Exactly one of {question step active, loading, result present} holds at
/// any time; `error` may co-occur with a question step (the retry state) but
/// never with a present result. The fields are private so the invariant can
/// only move through [`Wizard`] operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    step_index: usize,
    answers: Answers,
    loading: bool,
    error: Option<String>,
    result: Option<Value>,
}

impl WizardState {
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answer(&self, step_id: &str) -> Option<&Answer> {
        self.answers.get(step_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }
}

/// The single rendering the UI owes the user for a given state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderMode<'a> {
    Loading,
    Question(&'a QuestionStep),
    Result(&'a Value),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("invalid wizard configuration: {0}")]
    Configuration(String),
    #[error("step `{step_id}` is not the active step")]
    NotActiveStep { step_id: String },
    #[error("no question step is active")]
    NoActiveQuestion,
    #[error("step `{step_id}` is not a {expected:?} step")]
    WrongMode { step_id: String, expected: SelectionMode },
    #[error("option `{value}` is not offered by step `{step_id}`")]
    UnknownOption { step_id: String, value: String },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("submission is only allowed from the final step")]
    NotOnFinalStep,
    #[error("no submission is in flight")]
    NotLoading,
    #[error("restart is only allowed from the result phase")]
    NotInResultPhase,
}

/// Fixed question steps plus the operations that advance a [`WizardState`].
#[derive(Clone, Debug)]
pub struct Wizard {
    steps: Vec<QuestionStep>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self { steps: default_steps() }
    }
}

impl Wizard {
    /// Build a wizard over a custom step list.
    ///
    /// The final step must be a multi step: it is the submission gate, and
    /// single steps auto-advance on selection.
    pub fn new(steps: Vec<QuestionStep>) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::Configuration(
                "at least one question step is required".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for step in &steps {
            if !seen.insert(step.id.clone()) {
                return Err(WizardError::Configuration(format!(
                    "duplicate step id `{}`",
                    step.id
                )));
            }
            if step.options.is_empty() {
                return Err(WizardError::Configuration(format!(
                    "step `{}` offers no options",
                    step.id
                )));
            }
        }

        let last_is_multi =
            steps.last().map(|step| step.mode == SelectionMode::Multi).unwrap_or(false);
        if !last_is_multi {
            return Err(WizardError::Configuration(
                "the final step must use multi selection".to_string(),
            ));
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[QuestionStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn new_state(&self) -> WizardState {
        WizardState::default()
    }

    fn active_step<'a>(&'a self, state: &WizardState) -> Option<&'a QuestionStep> {
        if state.loading || state.result.is_some() {
            return None;
        }
        self.steps.get(state.step_index)
    }

    fn require_active<'a>(
        &'a self,
        state: &WizardState,
        step_id: &str,
    ) -> Result<&'a QuestionStep, WizardError> {
        if state.loading {
            return Err(WizardError::SubmissionInFlight);
        }
        let step = self.active_step(state).ok_or(WizardError::NoActiveQuestion)?;
        if step.id != step_id {
            return Err(WizardError::NotActiveStep { step_id: step_id.to_string() });
        }
        Ok(step)
    }

    /// Record a single-choice answer and advance to the next step.
    pub fn select_single(
        &self,
        state: &mut WizardState,
        step_id: &str,
        value: &str,
    ) -> Result<(), WizardError> {
        let step = self.require_active(state, step_id)?;
        if step.mode != SelectionMode::Single {
            return Err(WizardError::WrongMode {
                step_id: step.id.clone(),
                expected: SelectionMode::Single,
            });
        }
        if !step.has_option(value) {
            return Err(WizardError::UnknownOption {
                step_id: step.id.clone(),
                value: value.to_string(),
            });
        }

        state.answers.insert(step.id.clone(), Answer::Single(value.to_string()));
        state.step_index += 1;
        Ok(())
    }

    /// Toggle a value in a multi-choice step's selected set. Never advances.
    pub fn toggle_multi(
        &self,
        state: &mut WizardState,
        step_id: &str,
        value: &str,
    ) -> Result<(), WizardError> {
        let step = self.require_active(state, step_id)?;
        if step.mode != SelectionMode::Multi {
            return Err(WizardError::WrongMode {
                step_id: step.id.clone(),
                expected: SelectionMode::Multi,
            });
        }
        if !step.has_option(value) {
            return Err(WizardError::UnknownOption {
                step_id: step.id.clone(),
                value: value.to_string(),
            });
        }

        let entry =
            state.answers.entry(step.id.clone()).or_insert_with(|| Answer::Multi(Vec::new()));
        if !matches!(entry, Answer::Multi(_)) {
            *entry = Answer::Multi(Vec::new());
        }
        if let Answer::Multi(selected) = entry {
            if let Some(position) = selected.iter().position(|v| v == value) {
                selected.remove(position);
            } else {
                selected.push(value.to_string());
            }
        }
        Ok(())
    }

    /// Enter the loading phase and hand back the answers snapshot to submit.
    ///
    /// `loading` is the mutual-exclusion guard: a second `begin_submit`
    /// before `complete_submit`/`fail_submit` is rejected.
    pub fn begin_submit(&self, state: &mut WizardState) -> Result<Answers, WizardError> {
        if state.loading {
            return Err(WizardError::SubmissionInFlight);
        }
        if state.result.is_some() {
            return Err(WizardError::NoActiveQuestion);
        }
        if state.step_index != self.steps.len() - 1 {
            return Err(WizardError::NotOnFinalStep);
        }

        state.loading = true;
        state.error = None;
        Ok(state.answers.clone())
    }

    /// Store a successful submission result and enter the result phase.
    pub fn complete_submit(
        &self,
        state: &mut WizardState,
        result: Value,
    ) -> Result<(), WizardError> {
        if !state.loading {
            return Err(WizardError::NotLoading);
        }
        state.result = Some(result);
        state.step_index = self.steps.len();
        state.loading = false;
        state.error = None;
        Ok(())
    }

    /// Record a failed submission and return to the final question step.
    ///
    /// The failed request is not retried; the user resubmits explicitly.
    pub fn fail_submit(
        &self,
        state: &mut WizardState,
        message: impl Into<String>,
    ) -> Result<(), WizardError> {
        if !state.loading {
            return Err(WizardError::NotLoading);
        }
        state.error = Some(message.into());
        state.step_index = self.steps.len() - 1;
        state.loading = false;
        Ok(())
    }

    /// Reset to the first step. Only valid from the result phase.
    pub fn restart(&self, state: &mut WizardState) -> Result<(), WizardError> {
        if state.loading || state.result.is_none() {
            return Err(WizardError::NotInResultPhase);
        }
        *state = WizardState::default();
        Ok(())
    }

    /// Project the state to the single rendering the UI owes the user.
    pub fn render_mode<'a>(&'a self, state: &'a WizardState) -> RenderMode<'a> {
        if state.loading {
            return RenderMode::Loading;
        }
        if let Some(result) = &state.result {
            return RenderMode::Result(result);
        }
        let index = state.step_index.min(self.steps.len().saturating_sub(1));
        RenderMode::Question(&self.steps[index])
    }

    /// Progress percentage, monotonically non-decreasing over a forward
    /// traversal and clamped to 100.
    pub fn progress_percent(&self, state: &WizardState) -> u8 {
        let total = self.steps.len() + 1;
        let active = if state.loading || state.result.is_some() {
            self.steps.len()
        } else {
            state.step_index
        };
        let percent = (((active + 1) * 100) as f64 / total as f64).round() as u8;
        percent.min(100)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::wizard::steps::{StepOption, STEP_BOTTLENECK, STEP_SIZE, STEP_TECH};

    fn wizard() -> Wizard {
        Wizard::default()
    }

    fn answered_state(wizard: &Wizard) -> WizardState {
        let mut state = wizard.new_state();
        wizard.select_single(&mut state, STEP_SIZE, "10-50").expect("size");
        wizard.select_single(&mut state, STEP_BOTTLENECK, "support").expect("bottleneck");
        wizard.toggle_multi(&mut state, STEP_TECH, "slack").expect("tech");
        state
    }

    #[test]
    fn single_selection_records_answer_and_advances() {
        let wizard = wizard();
        let mut state = wizard.new_state();

        wizard.select_single(&mut state, STEP_SIZE, "1-10").expect("selection accepted");

        assert_eq!(state.step_index(), 1);
        assert_eq!(state.answer(STEP_SIZE).and_then(Answer::single), Some("1-10"));
    }

    #[test]
    fn selecting_on_an_inactive_step_is_rejected() {
        let wizard = wizard();
        let mut state = wizard.new_state();

        let error = wizard.select_single(&mut state, STEP_BOTTLENECK, "sales").unwrap_err();
        assert_eq!(error, WizardError::NotActiveStep { step_id: STEP_BOTTLENECK.to_string() });
        assert_eq!(state.step_index(), 0);
    }

    #[test]
    fn unknown_option_values_are_rejected() {
        let wizard = wizard();
        let mut state = wizard.new_state();

        let error = wizard.select_single(&mut state, STEP_SIZE, "galactic").unwrap_err();
        assert!(matches!(error, WizardError::UnknownOption { .. }));
        assert!(state.answer(STEP_SIZE).is_none());
    }

    #[test]
    fn toggle_on_a_single_step_is_a_mode_error() {
        let wizard = wizard();
        let mut state = wizard.new_state();

        let error = wizard.toggle_multi(&mut state, STEP_SIZE, "1-10").unwrap_err();
        assert_eq!(
            error,
            WizardError::WrongMode {
                step_id: STEP_SIZE.to_string(),
                expected: SelectionMode::Multi
            }
        );
    }

    #[test]
    fn double_toggle_restores_the_prior_selection() {
        let wizard = wizard();
        let mut state = answered_state(&wizard);
        wizard.toggle_multi(&mut state, STEP_TECH, "notion").expect("first toggle");
        let before = state.answer(STEP_TECH).cloned();

        wizard.toggle_multi(&mut state, STEP_TECH, "airtable").expect("toggle on");
        wizard.toggle_multi(&mut state, STEP_TECH, "airtable").expect("toggle off");

        assert_eq!(state.answer(STEP_TECH).cloned(), before);
    }

    #[test]
    fn toggle_preserves_selection_order() {
        let wizard = wizard();
        let mut state = answered_state(&wizard);
        wizard.toggle_multi(&mut state, STEP_TECH, "hubspot").expect("toggle");

        assert_eq!(
            state.answer(STEP_TECH).and_then(Answer::multi),
            Some(&["slack".to_string(), "hubspot".to_string()][..])
        );
    }

    #[test]
    fn step_index_never_decreases_until_restart() {
        let wizard = wizard();
        let mut state = wizard.new_state();
        let mut last = state.step_index();

        wizard.select_single(&mut state, STEP_SIZE, "50-200").expect("size");
        assert!(state.step_index() >= last);
        last = state.step_index();

        wizard.select_single(&mut state, STEP_BOTTLENECK, "reporting").expect("bottleneck");
        assert!(state.step_index() >= last);
        last = state.step_index();

        wizard.toggle_multi(&mut state, STEP_TECH, "shopify").expect("toggle");
        wizard.toggle_multi(&mut state, STEP_TECH, "shopify").expect("toggle");
        assert!(state.step_index() >= last);

        wizard.begin_submit(&mut state).expect("submit");
        wizard.complete_submit(&mut state, json!({"system": "x"})).expect("complete");
        assert!(state.step_index() >= last);

        wizard.restart(&mut state).expect("restart");
        assert_eq!(state.step_index(), 0);
    }

    #[test]
    fn submit_is_gated_on_the_final_step() {
        let wizard = wizard();
        let mut state = wizard.new_state();

        assert_eq!(wizard.begin_submit(&mut state).unwrap_err(), WizardError::NotOnFinalStep);
    }

    #[test]
    fn begin_submit_enters_loading_and_clears_error() {
        let wizard = wizard();
        let mut state = answered_state(&wizard);

        wizard.begin_submit(&mut state).expect("first submit");
        wizard.fail_submit(&mut state, "network down").expect("fail");
        assert_eq!(state.error(), Some("network down"));
        assert_eq!(state.step_index(), wizard.step_count() - 1);

        let answers = wizard.begin_submit(&mut state).expect("retry");
        assert!(state.is_loading());
        assert_eq!(state.error(), None);
        assert!(answers.contains_key(STEP_TECH));
    }

    #[test]
    fn loading_blocks_further_interaction() {
        let wizard = wizard();
        let mut state = answered_state(&wizard);
        wizard.begin_submit(&mut state).expect("submit");

        assert_eq!(
            wizard.toggle_multi(&mut state, STEP_TECH, "slack").unwrap_err(),
            WizardError::SubmissionInFlight
        );
        assert_eq!(wizard.begin_submit(&mut state).unwrap_err(), WizardError::SubmissionInFlight);
    }

    #[test]
    fn complete_submit_enters_the_result_phase() {
        let wizard = wizard();
        let mut state = answered_state(&wizard);
        wizard.begin_submit(&mut state).expect("submit");

        let result = json!({"diagnosis": "support overload"});
        wizard.complete_submit(&mut state, result.clone()).expect("complete");

        assert_eq!(state.result(), Some(&result));
        assert_eq!(state.step_index(), wizard.step_count());
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn completion_without_a_submission_is_rejected() {
        let wizard = wizard();
        let mut state = answered_state(&wizard);

        assert_eq!(
            wizard.complete_submit(&mut state, json!({})).unwrap_err(),
            WizardError::NotLoading
        );
        assert_eq!(wizard.fail_submit(&mut state, "x").unwrap_err(), WizardError::NotLoading);
    }

    #[test]
    fn restart_requires_the_result_phase() {
        let wizard = wizard();
        let mut state = answered_state(&wizard);

        assert_eq!(wizard.restart(&mut state).unwrap_err(), WizardError::NotInResultPhase);

        wizard.begin_submit(&mut state).expect("submit");
        wizard.complete_submit(&mut state, json!({})).expect("complete");
        wizard.restart(&mut state).expect("restart");

        assert_eq!(state, wizard.new_state());
    }

    #[test]
    fn render_mode_is_exclusive_across_the_whole_flow() {
        let wizard = wizard();
        let mut state = wizard.new_state();
        assert!(matches!(wizard.render_mode(&state), RenderMode::Question(step) if step.id == STEP_SIZE));

        state = answered_state(&wizard);
        assert!(matches!(wizard.render_mode(&state), RenderMode::Question(step) if step.id == STEP_TECH));

        wizard.begin_submit(&mut state).expect("submit");
        assert_eq!(wizard.render_mode(&state), RenderMode::Loading);

        let result = json!({"system": "Tier-1 AI Support Agent"});
        wizard.complete_submit(&mut state, result.clone()).expect("complete");
        assert_eq!(wizard.render_mode(&state), RenderMode::Result(&result));
    }

    #[test]
    fn error_state_keeps_the_question_rendering() {
        let wizard = wizard();
        let mut state = answered_state(&wizard);
        wizard.begin_submit(&mut state).expect("submit");
        wizard.fail_submit(&mut state, "Upstream model error. Try again shortly.").expect("fail");

        assert!(matches!(wizard.render_mode(&state), RenderMode::Question(step) if step.id == STEP_TECH));
        assert!(state.error().is_some());
        assert!(state.result().is_none());
    }

    #[test]
    fn progress_is_monotone_and_clamped() {
        let wizard = wizard();
        let mut state = wizard.new_state();
        let mut seen = vec![wizard.progress_percent(&state)];

        wizard.select_single(&mut state, STEP_SIZE, "200+").expect("size");
        seen.push(wizard.progress_percent(&state));
        wizard.select_single(&mut state, STEP_BOTTLENECK, "data-entry").expect("bottleneck");
        seen.push(wizard.progress_percent(&state));
        wizard.toggle_multi(&mut state, STEP_TECH, "custom").expect("toggle");
        seen.push(wizard.progress_percent(&state));
        wizard.begin_submit(&mut state).expect("submit");
        seen.push(wizard.progress_percent(&state));
        wizard.complete_submit(&mut state, json!({})).expect("complete");
        seen.push(wizard.progress_percent(&state));

        assert_eq!(seen, vec![25, 50, 75, 75, 100, 100]);
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(seen.iter().all(|&p| p <= 100));
    }

    #[test]
    fn configuration_rejects_a_single_final_step() {
        let steps = vec![QuestionStep::new(
            "only",
            "Pick one",
            SelectionMode::Single,
            vec![StepOption::new("A", "a")],
        )];

        let error = Wizard::new(steps).unwrap_err();
        assert!(matches!(error, WizardError::Configuration(_)));
    }

    #[test]
    fn configuration_rejects_duplicate_step_ids() {
        let steps = vec![
            QuestionStep::new("dup", "One", SelectionMode::Single, vec![StepOption::new("A", "a")]),
            QuestionStep::new("dup", "Two", SelectionMode::Multi, vec![StepOption::new("B", "b")]),
        ];

        assert!(matches!(Wizard::new(steps).unwrap_err(), WizardError::Configuration(_)));
    }
}
