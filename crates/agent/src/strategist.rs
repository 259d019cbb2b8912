use std::sync::Arc;

use serde_json::{json, Value};

use compass_core::domain::lead::NewContactMessage;
use compass_core::domain::strategy::StrategyRequest;

use crate::llm::{LlmClient, LlmError};
use crate::prompt;

/// A strategy reply plus the raw oracle text it was parsed from. The raw
/// text is what lead capture persists, parseable or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedStrategy {
    pub result: Value,
    pub raw: String,
}

/// Asks the oracle for a recommendation and normalizes its reply.
pub struct Strategist {
    client: Arc<dyn LlmClient>,
}

impl Strategist {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub async fn generate(
        &self,
        request: &StrategyRequest,
    ) -> Result<GeneratedStrategy, LlmError> {
        let raw = self
            .client
            .complete(prompt::STRATEGY_SYSTEM_PROMPT, &prompt::strategy_user_prompt(request))
            .await?;

        Ok(GeneratedStrategy { result: parse_strategy_reply(&raw), raw })
    }

    pub async fn triage_contact(&self, message: &NewContactMessage) -> Result<Value, LlmError> {
        let raw = self
            .client
            .complete(prompt::TRIAGE_SYSTEM_PROMPT, &prompt::triage_user_prompt(message))
            .await?;

        Ok(parse_triage_reply(&raw))
    }
}

/// Parse the oracle text as JSON; on failure wrap the raw text so the caller
/// always receives a structured value, never bare model text.
pub fn parse_strategy_reply(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => value,
        Err(_) => json!({ "raw": raw }),
    }
}

/// Triage degrades differently: an unparseable reply still yields a usable
/// draft, with the model text as the body.
pub fn parse_triage_reply(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => value,
        Err(_) => json!({ "subject": "Draft reply", "body": raw }),
    }
}
