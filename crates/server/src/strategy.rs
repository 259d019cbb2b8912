//! `POST /api/strategy` — the strategy assistant endpoint.
//!
//! Contract: validate, ask the oracle, decide the response, then capture the
//! lead. Lead capture runs after the response is decided and its failures
//! are logged, never surfaced; an oracle failure likewise never blocks lead
//! capture.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};
use tracing::{error, warn};
use uuid::Uuid;

use compass_core::domain::lead::NewLead;
use compass_core::domain::strategy::StrategyRequest;
use compass_core::errors::{ApplicationError, InterfaceError};

use crate::app::ApiState;

pub const MISSING_FIELDS_MESSAGE: &str = "companySize and bottleneck are required.";
pub const UPSTREAM_ERROR_MESSAGE: &str = "Upstream model error. Try again shortly.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// CORS preflight. The browser sends OPTIONS before the cross-origin POST.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn generate(
    State(state): State<ApiState>,
    body: Result<Json<StrategyRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let correlation_id = Uuid::new_v4().to_string();

    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            warn!(
                event_name = "strategy.body_rejected",
                correlation_id = %correlation_id,
                reason = %rejection.body_text(),
                "strategy request body could not be read"
            );
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": rejection.body_text() })));
        }
    };

    match run(&state, request, &correlation_id).await {
        Ok(response) => response,
        Err(application_error) => {
            let interface = application_error.into_interface(correlation_id.clone());
            warn!(
                event_name = "strategy.request_rejected",
                correlation_id = %correlation_id,
                error = %interface,
                "strategy request rejected"
            );
            respond_with_error(&interface)
        }
    }
}

async fn run(
    state: &ApiState,
    request: StrategyRequest,
    correlation_id: &str,
) -> Result<(StatusCode, Json<Value>), ApplicationError> {
    // No side effects before validation: no oracle call, no lead row.
    request.validate().map_err(ApplicationError::from)?;

    let (status, body, raw_response) = match &state.strategist {
        Some(strategist) => match strategist.generate(&request).await {
            Ok(generated) => {
                (StatusCode::OK, json!({ "result": generated.result }), Some(generated.raw))
            }
            Err(oracle_error) => {
                warn!(
                    event_name = "strategy.oracle_failed",
                    correlation_id = %correlation_id,
                    error = %oracle_error,
                    "oracle call failed; lead capture proceeds without an AI response"
                );
                (StatusCode::BAD_GATEWAY, json!({ "error": UPSTREAM_ERROR_MESSAGE }), None)
            }
        },
        None => {
            warn!(
                event_name = "strategy.oracle_unconfigured",
                correlation_id = %correlation_id,
                "no oracle configured; responding as an upstream failure"
            );
            (StatusCode::BAD_GATEWAY, json!({ "error": UPSTREAM_ERROR_MESSAGE }), None)
        }
    };

    // The response is decided. Lead capture is best-effort from here on.
    if let Err(capture_error) = state.leads.append(NewLead::from_submission(&request, raw_response)).await
    {
        error!(
            event_name = "strategy.lead_capture_failed",
            correlation_id = %correlation_id,
            error = %capture_error,
            "lead capture failed; response unchanged"
        );
    }

    Ok((status, Json(body)))
}

fn respond_with_error(interface: &InterfaceError) -> (StatusCode, Json<Value>) {
    match interface {
        InterfaceError::BadRequest { .. } => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": MISSING_FIELDS_MESSAGE })))
        }
        InterfaceError::ServiceUnavailable { .. } => {
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": UPSTREAM_ERROR_MESSAGE })))
        }
        InterfaceError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": INTERNAL_ERROR_MESSAGE })))
        }
    }
}
