use serde::{Deserialize, Serialize};

use crate::domain::strategy::StrategyRequest;

/// Status tag stamped on captured leads. This subsystem only ever writes
/// `new`; later pipeline stages own the rest of the lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
        }
    }
}

/// A captured strategy submission, appended once and never mutated.
///
/// `ai_response` holds the raw oracle text when a reply was obtained; it is
/// null when the oracle failed, because lead capture must not depend on the
/// oracle succeeding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company_size: String,
    pub bottleneck: String,
    pub tech_stack: Vec<String>,
    pub ai_response: Option<String>,
    pub status: LeadStatus,
}

impl NewLead {
    pub fn from_submission(request: &StrategyRequest, ai_response: Option<String>) -> Self {
        Self {
            name: request.name.clone().filter(|value| !value.trim().is_empty()),
            email: request.email.clone().filter(|value| !value.trim().is_empty()),
            company_size: request.company_size.clone(),
            bottleneck: request.bottleneck.clone(),
            tech_stack: request.tech_stack.clone(),
            ai_response,
            status: LeadStatus::New,
        }
    }
}

/// A contact-form submission captured for follow-up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
    pub form_type: String,
}
