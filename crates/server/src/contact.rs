//! `POST /api/contact` — contact-form intake.
//!
//! Wire field names are snake_case because the site's forms post them that
//! way. A submission always succeeds once past the honeypot: storage and
//! triage failures degrade to warnings in the response, never to errors.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};
use uuid::Uuid;

use compass_core::domain::lead::NewContactMessage;

use crate::app::ApiState;

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
    pub form_type: String,
    /// Consent to run the submission through the oracle. Forms post
    /// checkbox-shaped values, so this accepts any JSON and is read for
    /// truthiness.
    pub ai_consent: Value,
    /// Honeypot field. Humans never fill it; any non-empty value is spam.
    #[serde(rename = "_gotcha")]
    pub gotcha: Value,
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub async fn submit(
    State(state): State<ApiState>,
    body: Result<Json<ContactSubmission>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let correlation_id = Uuid::new_v4().to_string();

    let Json(submission) = match body {
        Ok(json) => json,
        Err(rejection) => {
            warn!(
                event_name = "contact.body_rejected",
                correlation_id = %correlation_id,
                reason = %rejection.body_text(),
                "contact request body could not be read"
            );
            return (StatusCode::BAD_REQUEST, Json(json!({ "ok": false, "error": "invalid_body" })));
        }
    };

    if truthy(&submission.gotcha) {
        warn!(
            event_name = "contact.honeypot_tripped",
            correlation_id = %correlation_id,
            "honeypot field was filled; dropping submission"
        );
        return (StatusCode::BAD_REQUEST, Json(json!({ "ok": false, "error": "spam" })));
    }

    let message = NewContactMessage {
        first_name: submission.first_name,
        last_name: submission.last_name,
        email: submission.email,
        message: submission.message,
        form_type: submission.form_type,
    };

    // Capture first, best-effort; the response below does not depend on it.
    if let Err(capture_error) = state.contacts.append(message.clone()).await {
        error!(
            event_name = "contact.capture_failed",
            correlation_id = %correlation_id,
            error = %capture_error,
            "contact capture failed; response unchanged"
        );
    }

    if !truthy(&submission.ai_consent) {
        return (StatusCode::OK, Json(json!({ "ok": true, "ai": null })));
    }

    match &state.strategist {
        None => (
            StatusCode::OK,
            Json(json!({ "ok": true, "ai": null, "warning": "No AI backend configured" })),
        ),
        Some(strategist) => match strategist.triage_contact(&message).await {
            Ok(ai) => (StatusCode::OK, Json(json!({ "ok": true, "ai": ai }))),
            Err(triage_error) => {
                warn!(
                    event_name = "contact.triage_failed",
                    correlation_id = %correlation_id,
                    error = %triage_error,
                    "triage failed; submission already captured"
                );
                (
                    StatusCode::OK,
                    Json(json!({ "ok": true, "ai": null, "warning": "AI generation failed" })),
                )
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;
    use serde_json::json;

    use compass_agent::llm::{LlmClient, LlmError};
    use compass_agent::Strategist;
    use compass_db::{InMemoryContactRepository, InMemoryLeadRepository};

    use crate::app::ApiState;
    use crate::contact::{submit, ContactSubmission};

    struct CannedOracle {
        reply: String,
    }

    #[async_trait]
    impl LlmClient for CannedOracle {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Ok(self.reply.clone())
        }
    }

    struct UnreachableOracle;

    #[async_trait]
    impl LlmClient for UnreachableOracle {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Err(LlmError::UpstreamStatus { status: 500, body: "boom".to_string() })
        }
    }

    fn state(
        oracle: Option<Arc<dyn LlmClient>>,
    ) -> (ApiState, Arc<InMemoryContactRepository>) {
        let contacts = Arc::new(InMemoryContactRepository::default());
        let api_state = ApiState {
            strategist: oracle.map(|client| Arc::new(Strategist::new(client))),
            leads: Arc::new(InMemoryLeadRepository::default()),
            contacts: contacts.clone(),
        };
        (api_state, contacts)
    }

    fn submission(ai_consent: serde_json::Value) -> ContactSubmission {
        ContactSubmission {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            message: "Looking at reporting automation.".to_string(),
            form_type: "contact".to_string(),
            ai_consent,
            ..ContactSubmission::default()
        }
    }

    #[tokio::test]
    async fn honeypot_submissions_are_rejected_and_never_stored() {
        let (api_state, contacts) = state(None);
        let spam = ContactSubmission { gotcha: json!("bot"), ..submission(json!(null)) };

        let (status, Json(body)) = submit(State(api_state), Ok(Json(spam))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "ok": false, "error": "spam" }));
        assert!(contacts.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn submission_without_consent_is_stored_and_skips_the_oracle() {
        let (api_state, contacts) = state(None);

        let (status, Json(body)) = submit(State(api_state), Ok(Json(submission(json!(null))))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "ai": null }));

        let records = contacts.snapshot().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "grace@example.com");
    }

    #[tokio::test]
    async fn consent_without_an_oracle_warns_instead_of_failing() {
        let (api_state, _contacts) = state(None);

        let (status, Json(body)) =
            submit(State(api_state), Ok(Json(submission(json!(true))))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "ok": true, "ai": null, "warning": "No AI backend configured" })
        );
    }

    #[tokio::test]
    async fn consented_submission_returns_the_triage_object() {
        let triage = json!({
            "intent": "pricing",
            "priority": "medium",
            "subject": "Re: reporting automation",
            "body": "Happy to walk through options."
        });
        let (api_state, contacts) = state(Some(Arc::new(CannedOracle {
            reply: triage.to_string(),
        })));

        let (status, Json(body)) =
            submit(State(api_state), Ok(Json(submission(json!(true))))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "ai": triage }));
        assert_eq!(contacts.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn triage_failure_still_reports_a_captured_submission() {
        let (api_state, contacts) = state(Some(Arc::new(UnreachableOracle)));

        let (status, Json(body)) =
            submit(State(api_state), Ok(Json(submission(json!("yes"))))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "ai": null, "warning": "AI generation failed" }));
        assert_eq!(contacts.snapshot().await.len(), 1);
    }
}
