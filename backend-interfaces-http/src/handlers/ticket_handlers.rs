use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use backend_application::commands::{bulk_render_commands, issuance_commands, ticket_admin_commands};
use backend_application::queries::ticket_queries;
use backend_application::AppState;
use backend_domain::{BulkIssueReport, BulkIssueRequest, IssueTicketRequest, ScanAttemptLog, TicketRecord};

use crate::error::HttpError;
use crate::middleware::{actor_id, authorize, idempotency_key, parse_json_body};

#[derive(serde::Deserialize)]
pub struct ScanHistoryQuery {
    pub limit: Option<usize>,
}

pub async fn issue_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<IssueTicketRequest>,
) -> Result<(StatusCode, Json<TicketRecord>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let record = issuance_commands::issue_single(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn issue_bulk(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<BulkIssueReport>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let payload: BulkIssueRequest = parse_json_body(&headers, &body)
        .map_err(|err| HttpError::BadRequest(err.to_string()))?;

    let key = claim_request(&state, &headers, "bulk-issue").await?;
    let result = issuance_commands::issue_batch(&state, payload).await;
    release_request(&state, key).await;
    Ok(Json(result?))
}

/// Streams the gzip archive; per-item outcomes travel in response headers.
pub async fn render_bulk(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let payload: BulkIssueRequest = parse_json_body(&headers, &body)
        .map_err(|err| HttpError::BadRequest(err.to_string()))?;
    let event_id = payload.event_id.clone();

    let key = claim_request(&state, &headers, "bulk-render").await?;
    let result = bulk_render_commands::render_bulk(&state, payload).await;
    release_request(&state, key).await;
    let report = result?;

    let file_name = format!(
        "tickets-{}.{}",
        sanitize_file_stem(&event_id),
        state.archive.file_extension()
    );
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .map_err(|err| HttpError::Internal(err.to_string()))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(state.archive.content_type()),
    );
    response_headers.insert(header::CONTENT_DISPOSITION, disposition);
    response_headers.insert(
        HeaderName::from_static("x-tickets-requested"),
        HeaderValue::from(report.requested),
    );
    response_headers.insert(
        HeaderName::from_static("x-tickets-generated"),
        HeaderValue::from(report.generated),
    );
    response_headers.insert(
        HeaderName::from_static("x-tickets-skipped"),
        HeaderValue::from(report.skipped),
    );
    response_headers.insert(
        HeaderName::from_static("x-persistence-errors"),
        HeaderValue::from(report.persistence_errors()),
    );
    Ok((response_headers, report.archive).into_response())
}

pub async fn get_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ticket_number): Path<String>,
) -> Result<Json<TicketRecord>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let record = ticket_queries::get_ticket(&state, &ticket_number).await?;
    Ok(Json(record))
}

pub async fn list_ticket_scans(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ticket_number): Path<String>,
    Query(query): Query<ScanHistoryQuery>,
) -> Result<Json<Vec<ScanAttemptLog>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let logs = ticket_queries::list_ticket_scans(&state, &ticket_number, query.limit).await?;
    Ok(Json(logs))
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ticket_number): Path<String>,
) -> Result<Json<TicketRecord>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let actor = actor_id(&headers).ok_or(HttpError::Unauthorized)?;
    let record = ticket_admin_commands::cancel_ticket(&state, &actor, &ticket_number).await?;
    Ok(Json(record))
}

async fn claim_request(
    state: &AppState,
    headers: &HeaderMap,
    scope: &str,
) -> Result<Option<String>, HttpError> {
    let Some(key) = idempotency_key(headers) else {
        return Ok(None);
    };
    let key = format!("{}:{}", scope, key);
    if !state.inflight.try_begin(&key).await {
        warn!(key = %key, "duplicate request while original is in flight");
        return Err(HttpError::Conflict(
            "request with this Idempotency-Key is already in progress".to_string(),
        ));
    }
    Ok(Some(key))
}

async fn release_request(state: &AppState, key: Option<String>) {
    if let Some(key) = key {
        state.inflight.finish(&key).await;
    }
}

fn sanitize_file_stem(value: &str) -> String {
    let stem: String = value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .take(64)
        .collect();
    if stem.is_empty() {
        "bulk".to_string()
    } else {
        stem
    }
}
