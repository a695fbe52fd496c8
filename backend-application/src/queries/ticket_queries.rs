use crate::{AppError, AppState};
use backend_domain::{ScanAttemptLog, TicketNumber, TicketRecord};

const MAX_SCAN_HISTORY: usize = 500;

pub async fn get_ticket(state: &AppState, ticket_number: &str) -> Result<TicketRecord, AppError> {
    let number = TicketNumber::from(ticket_number);
    if number.as_str().is_empty() {
        return Err(AppError::BadRequest("ticket number is required".to_string()));
    }
    state
        .tickets
        .get_by_number(&number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ticket '{}'", number)))
}

/// Scan history of one ticket, newest first.
pub async fn list_ticket_scans(
    state: &AppState,
    ticket_number: &str,
    limit: Option<usize>,
) -> Result<Vec<ScanAttemptLog>, AppError> {
    let record = get_ticket(state, ticket_number).await?;
    let limit = limit.unwrap_or(100).clamp(1, MAX_SCAN_HISTORY);
    let logs = state.scan_logs.list_for_ticket(record.ticket_id(), limit).await?;
    Ok(logs)
}
