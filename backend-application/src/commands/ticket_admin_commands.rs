use tracing::info;

use crate::{AppError, AppState};
use backend_domain::{TicketChange, TicketNumber, TicketRecord, TicketStatus};

/// Organizer-only `valid -> cancelled`.
pub async fn cancel_ticket(
    state: &AppState,
    actor: &str,
    ticket_number: &str,
) -> Result<TicketRecord, AppError> {
    let number = TicketNumber::from(ticket_number);
    let record = state
        .tickets
        .get_by_number(&number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ticket '{}'", number)))?;

    let event = state.events.get_event(&record.identity.event_id).await?;
    let is_organizer = event
        .map(|info| !actor.trim().is_empty() && info.organizer_id == actor.trim())
        .unwrap_or(false);
    if !is_organizer {
        return Err(AppError::Unauthorized);
    }

    let cancelled = state
        .tickets
        .conditional_transition(record.ticket_id(), TicketStatus::Valid, TicketChange::cancel())
        .await?;
    if !cancelled {
        let current = state
            .tickets
            .get_by_id(record.ticket_id())
            .await?
            .map(|current| current.status)
            .unwrap_or(record.status);
        return Err(AppError::Conflict(format!(
            "ticket '{}' is {} and cannot be cancelled",
            number,
            current.as_str()
        )));
    }

    info!(ticket_number = %number, actor = %actor.trim(), "ticket cancelled");
    let updated = state.tickets.get_by_id(record.ticket_id()).await?;
    Ok(updated.unwrap_or(record))
}
