use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::verification_commands;
use backend_application::AppState;
use backend_domain::{ScanOutcome, ScanRequest};

use crate::error::HttpError;
use crate::middleware::{actor_id, authorize};

/// Every business outcome is a 200 with `success` and `result` in the body.
pub async fn scan_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut payload): Json<ScanRequest>,
) -> Result<Json<ScanOutcome>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    if let Some(actor) = actor_id(&headers) {
        payload.scanned_by = actor;
    }
    let outcome = verification_commands::verify_scan(&state, payload).await?;
    Ok(Json(outcome))
}
