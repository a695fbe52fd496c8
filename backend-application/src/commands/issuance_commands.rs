use std::time::Duration as StdDuration;

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AppError, AppState};
use backend_domain::{
    attendee_display_name, normalize_optional_text, plan_batches, BulkIssueReport,
    BulkIssueRequest, EventInfo, IssueFailure, IssueTicketRequest, TicketId, TicketIdentity,
    TicketRecord,
};

pub const DEFAULT_ATTENDEE_PREFIX: &str = "Guest";

/// Fields every ticket of one issuance request shares.
#[derive(Debug, Clone)]
pub struct TicketDraft {
    pub owner_id: String,
    pub booking_id: String,
    pub ticket_type: String,
    pub event_date: DateTime<Utc>,
}

pub async fn issue_single(
    state: &AppState,
    request: IssueTicketRequest,
) -> Result<TicketRecord, AppError> {
    let draft = TicketDraft {
        owner_id: normalize_required_text(request.owner_id, "owner_id")?,
        booking_id: normalize_required_text(request.booking_id, "booking_id")?,
        ticket_type: normalize_required_text(request.ticket_type, "ticket_type")?,
        event_date: request.event_date,
    };
    let event = load_event(state, &request.event_id).await?;
    let attendee_name = normalize_optional_text(request.attendee_name);

    let record = persist_new_ticket(state, &event, &draft, attendee_name)
        .await
        .map_err(|err| {
            state.metrics.record_issue_failures(1);
            err
        })?;
    state.metrics.record_issued(1);
    info!(
        ticket_number = %record.ticket_number(),
        event_id = %event.event_id,
        "ticket issued"
    );
    Ok(record)
}

/// Best-effort bulk issuance: a failing item is reported and the run continues.
pub async fn issue_batch(
    state: &AppState,
    request: BulkIssueRequest,
) -> Result<BulkIssueReport, AppError> {
    let quantity = validate_quantity(request.quantity, state.config.bulk_max_quantity)?;
    let batch_size = request
        .batch_size
        .unwrap_or(state.config.bulk_default_batch_size)
        .clamp(1, quantity as usize);
    let draft = bulk_draft(&request)?;
    let event = load_event(state, &request.event_id).await?;
    let prefix = normalize_optional_text(request.attendee_prefix.clone())
        .unwrap_or_else(|| DEFAULT_ATTENDEE_PREFIX.to_string());

    let batches = plan_batches(quantity, batch_size);
    let batch_count = batches.len();
    let delay = StdDuration::from_millis(state.config.bulk_batch_delay_ms);
    let mut tickets = Vec::with_capacity(quantity as usize);
    let mut failures = Vec::new();

    for (batch_index, batch) in batches.into_iter().enumerate() {
        for index in batch {
            let sequence = index + 1;
            let attendee = attendee_display_name(&prefix, sequence, quantity);
            match persist_new_ticket(state, &event, &draft, Some(attendee)).await {
                Ok(record) => tickets.push(record),
                Err(err) => {
                    warn!(sequence, error = %err, "bulk issuance item failed");
                    failures.push(IssueFailure {
                        sequence,
                        reason: err.to_string(),
                    });
                }
            }
        }
        if batch_index + 1 < batch_count && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    state.metrics.record_issued(tickets.len());
    state.metrics.record_issue_failures(failures.len());
    info!(
        event_id = %event.event_id,
        requested = quantity,
        issued = tickets.len(),
        failed = failures.len(),
        "bulk issuance finished"
    );

    Ok(BulkIssueReport {
        requested: quantity,
        batches: batch_count as u32,
        tickets,
        failures,
    })
}

/// Builds a ticket record with its token. Nothing is written.
pub fn mint_ticket(
    state: &AppState,
    event: &EventInfo,
    draft: &TicketDraft,
    attendee_name: Option<String>,
    now: DateTime<Utc>,
) -> Result<TicketRecord, AppError> {
    let identity = TicketIdentity {
        ticket_id: TicketId::generate(),
        event_id: event.event_id.clone(),
        booking_id: draft.booking_id.clone(),
        owner_id: draft.owner_id.clone(),
        ticket_number: state.ticket_numbers.next(&event.number_prefix(), now),
        ticket_type: draft.ticket_type.clone(),
        event_date: draft.event_date,
        valid_until: validity_end(now, state.config.ticket_validity_days)?,
    };
    let payload = state.codec.payload_for(&identity);
    let token = state
        .codec
        .encode_at(&payload, now)
        .map_err(|err| AppError::Internal(anyhow!(err)))?;
    Ok(TicketRecord::new(identity, token, attendee_name, now))
}

fn validity_end(now: DateTime<Utc>, validity_days: i64) -> Result<DateTime<Utc>, AppError> {
    Duration::try_days(validity_days)
        .and_then(|validity| now.checked_add_signed(validity))
        .ok_or_else(|| {
            AppError::Internal(anyhow!("ticket_validity_days {} is out of range", validity_days))
        })
}

/// Mints and stores one ticket. A ticket number collision is retried once
/// with a freshly allocated number.
pub async fn persist_new_ticket(
    state: &AppState,
    event: &EventInfo,
    draft: &TicketDraft,
    attendee_name: Option<String>,
) -> Result<TicketRecord, AppError> {
    for _ in 0..2 {
        let record = mint_ticket(state, event, draft, attendee_name.clone(), Utc::now())?;
        if state.tickets.insert(record.clone()).await? {
            return Ok(record);
        }
        warn!(ticket_number = %record.ticket_number(), "ticket number collision, retrying");
    }
    Err(AppError::Conflict(
        "could not allocate a unique ticket number".to_string(),
    ))
}

pub async fn load_event(state: &AppState, event_id: &str) -> Result<EventInfo, AppError> {
    let event_id = event_id.trim();
    if event_id.is_empty() {
        return Err(AppError::BadRequest("event_id is required".to_string()));
    }
    state
        .events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("event '{}'", event_id)))
}

pub fn validate_quantity(quantity: i64, ceiling: u32) -> Result<u32, AppError> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than zero".to_string(),
        ));
    }
    if quantity > i64::from(ceiling) {
        return Err(AppError::BadRequest(format!(
            "quantity {} exceeds the limit of {}",
            quantity, ceiling
        )));
    }
    Ok(quantity as u32)
}

pub fn bulk_draft(request: &BulkIssueRequest) -> Result<TicketDraft, AppError> {
    let booking_id = normalize_optional_text(request.booking_id.clone())
        .unwrap_or_else(|| format!("bulk-{}", Uuid::new_v4()));
    Ok(TicketDraft {
        owner_id: normalize_required_text(request.owner_id.clone(), "owner_id")?,
        booking_id,
        ticket_type: normalize_required_text(request.ticket_type.clone(), "ticket_type")?,
        event_date: request.event_date,
    })
}

fn normalize_required_text(value: String, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_bounds_are_enforced() {
        assert!(matches!(validate_quantity(0, 5000), Err(AppError::BadRequest(_))));
        assert!(matches!(validate_quantity(-3, 5000), Err(AppError::BadRequest(_))));
        assert!(matches!(validate_quantity(5001, 5000), Err(AppError::BadRequest(_))));
        assert_eq!(validate_quantity(5000, 5000).expect("at ceiling"), 5000);
        assert_eq!(validate_quantity(1, 5000).expect("one"), 1);
    }

    #[test]
    fn bulk_draft_generates_booking_id_when_missing() {
        let request = BulkIssueRequest {
            event_id: "E1".to_string(),
            owner_id: " org-1 ".to_string(),
            booking_id: None,
            ticket_type: "general".to_string(),
            event_date: Utc::now(),
            quantity: 10,
            batch_size: None,
            attendee_prefix: None,
        };
        let draft = bulk_draft(&request).expect("draft");
        assert_eq!(draft.owner_id, "org-1");
        assert!(draft.booking_id.starts_with("bulk-"));
    }

    #[test]
    fn validity_end_rejects_unrepresentable_windows() {
        let now = Utc::now();
        assert_eq!(validity_end(now, 365).expect("one year"), now + Duration::days(365));
        assert!(matches!(validity_end(now, i64::MAX), Err(AppError::Internal(_))));
        assert!(matches!(validity_end(now, 200_000_000), Err(AppError::Internal(_))));
    }

    #[test]
    fn blank_owner_is_rejected() {
        assert!(matches!(
            normalize_required_text("   ".to_string(), "owner_id"),
            Err(AppError::BadRequest(_))
        ));
    }
}
