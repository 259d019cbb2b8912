pub mod engine;
pub mod steps;

pub use engine::{Answer, Answers, RenderMode, Wizard, WizardError, WizardState};
pub use steps::{default_steps, QuestionStep, SelectionMode, StepOption};
