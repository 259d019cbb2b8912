pub mod config;
pub mod domain;
pub mod errors;
pub mod playbook;
pub mod wizard;

pub use domain::lead::{LeadStatus, NewContactMessage, NewLead};
pub use domain::strategy::{Recommendation, StrategyRequest};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use wizard::{
    Answer, Answers, QuestionStep, RenderMode, SelectionMode, StepOption, Wizard, WizardError,
    WizardState,
};
