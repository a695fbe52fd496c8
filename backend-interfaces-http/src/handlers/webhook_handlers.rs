use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use backend_application::commands::webhook_commands::{self, WebhookOutcome};
use backend_application::AppState;
use backend_domain::{ReplayReason, TicketError};

use crate::error::HttpError;
use crate::middleware::parse_json_body;

#[derive(Serialize)]
struct WebhookRejection {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<ReplayReason>,
}

/// Payment notifications authenticate by signature, not by bearer token.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, HttpError> {
    let raw: serde_json::Value = parse_json_body(&headers, &body)
        .map_err(|err| HttpError::BadRequest(err.to_string()))?;
    let outcome = webhook_commands::handle_payment_webhook(&state, raw).await?;
    let response = match outcome {
        WebhookOutcome::Processed(receipt) | WebhookOutcome::Ignored(receipt) => {
            (StatusCode::OK, Json(receipt)).into_response()
        }
        WebhookOutcome::Replay(reason) => (
            StatusCode::CONFLICT,
            Json(WebhookRejection {
                error: TicketError::ReplayDetected.to_string(),
                reason: Some(reason),
            }),
        )
            .into_response(),
        WebhookOutcome::SignatureRejected => (
            StatusCode::UNAUTHORIZED,
            Json(WebhookRejection {
                error: TicketError::SignatureMismatch.to_string(),
                reason: None,
            }),
        )
            .into_response(),
    };
    Ok(response)
}
