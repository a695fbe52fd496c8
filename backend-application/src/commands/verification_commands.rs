// Scan-time verification
//
// One call drives one scan through decode, lookup, record binding, actor
// authorization, event match and status checks, then commits `valid -> used`
// with a single conditional write. Every path appends exactly one scan log.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::security::CodecError;
use crate::{AppError, AppState};
use backend_domain::{
    authorize_scanner, check_event_match, check_status, normalize_optional_text, EventInfo,
    ScanAttemptLog, ScanDetail, ScanOutcome, ScanRequest, ScanResult, TicketChange, TicketError,
    TicketRecord, TicketStatus,
};

struct ScanContext {
    actor: String,
    device_info: Option<String>,
    now: DateTime<Utc>,
}

pub async fn verify_scan(state: &AppState, request: ScanRequest) -> Result<ScanOutcome, AppError> {
    let ctx = ScanContext {
        actor: request.scanned_by.trim().to_string(),
        device_info: normalize_optional_text(request.device_info),
        now: Utc::now(),
    };

    let payload = match state.codec.decode_at(&request.token, ctx.now) {
        Ok(payload) => payload,
        Err(CodecError::SignatureMismatch {
            ticket_number: Some(number),
        }) => {
            // A signature mismatch naming a ticket we hold is tampering; any
            // other undecodable token stays a generic invalid.
            let known = match state.tickets.get_by_number(&number).await {
                Ok(found) => found,
                Err(err) => return storage_failure(state, &ctx, None, err).await,
            };
            return match known {
                Some(record) => {
                    reject(state, &ctx, Some(&record), None, TicketError::TamperedToken).await
                }
                None => reject(state, &ctx, None, None, TicketError::InvalidToken).await,
            };
        }
        Err(err) => return reject(state, &ctx, None, None, TicketError::from(err)).await,
    };

    let record = match state.tickets.get_by_number(payload.ticket_number()).await {
        Ok(Some(record)) => record,
        Ok(None) => return reject(state, &ctx, None, None, TicketError::InvalidToken).await,
        Err(err) => return storage_failure(state, &ctx, None, err).await,
    };

    if !state.codec.matches_record(&payload, &record) {
        return reject(state, &ctx, Some(&record), None, TicketError::TamperedToken).await;
    }

    let event_id = record.identity.event_id.clone();
    let event = match state.events.get_event(&event_id).await {
        Ok(event) => event,
        Err(err) => return storage_failure(state, &ctx, Some(&record), err).await,
    };
    let permission = if ctx.actor.is_empty() {
        None
    } else {
        match state.events.staff_permission(&event_id, &ctx.actor).await {
            Ok(permission) => permission,
            Err(err) => return storage_failure(state, &ctx, Some(&record), err).await,
        }
    };

    let early_window = early_checkin_window(state.config.early_checkin_hours);
    let precheck = authorize_scanner(&ctx.actor, event.as_ref(), permission.as_ref())
        .and_then(|_| {
            check_event_match(&record, event.as_ref(), request.expected_event_id.as_deref())
        })
        .and_then(|_| check_status(&record, event.as_ref(), ctx.now, early_window));
    if let Err(err) = precheck {
        return reject(state, &ctx, Some(&record), event.as_ref(), err).await;
    }

    let committed = match state
        .tickets
        .conditional_transition(
            record.ticket_id(),
            TicketStatus::Valid,
            TicketChange::check_in(&ctx.actor, ctx.now),
        )
        .await
    {
        Ok(committed) => committed,
        Err(err) => return storage_failure(state, &ctx, Some(&record), err).await,
    };

    if !committed {
        // Another scanner won the transition; report what the store holds now.
        let current = match state.tickets.get_by_id(record.ticket_id()).await {
            Ok(current) => current.unwrap_or(record),
            Err(err) => return storage_failure(state, &ctx, Some(&record), err).await,
        };
        let err = check_status(&current, event.as_ref(), ctx.now, early_window)
            .err()
            .unwrap_or(TicketError::AlreadyUsed {
                checked_in_at: current.checked_in_at,
                checked_in_by: current.checked_in_by.clone(),
            });
        return reject(state, &ctx, Some(&current), event.as_ref(), err).await;
    }

    append_log(state, &ctx, Some(&record), ScanResult::Success).await;
    state.metrics.record_scan(ScanResult::Success);
    info!(
        ticket_number = %record.ticket_number(),
        event_id = %record.identity.event_id,
        actor = %ctx.actor,
        "ticket checked in"
    );

    let mut detail = ticket_detail(&record, event.as_ref());
    detail.checked_in_at = Some(ctx.now);
    detail.checked_in_by = Some(ctx.actor.clone());
    detail.scan_count = Some(record.scan_count.saturating_add(1));
    Ok(ScanOutcome {
        result: ScanResult::Success,
        success: true,
        message: "check-in successful".to_string(),
        detail,
    })
}

/// Logs and counts a rejected scan and turns it into an outcome for the caller.
async fn reject(
    state: &AppState,
    ctx: &ScanContext,
    record: Option<&TicketRecord>,
    event: Option<&EventInfo>,
    err: TicketError,
) -> Result<ScanOutcome, AppError> {
    let result = err.scan_result();
    if let Some(record) = record {
        if let Err(store_err) = state
            .tickets
            .record_scan_attempt(record.ticket_id(), ctx.now)
            .await
        {
            warn!(
                ticket_number = %record.ticket_number(),
                error = %store_err,
                "failed to count scan attempt"
            );
        }
    }
    append_log(state, ctx, record, result).await;
    state.metrics.record_scan(result);

    match result {
        ScanResult::Tampered => warn!(
            ticket_number = ?record.map(|r| r.ticket_number().as_str()),
            actor = %ctx.actor,
            "tampered ticket presented"
        ),
        _ => info!(result = result.as_str(), actor = %ctx.actor, "scan rejected"),
    }

    Ok(ScanOutcome {
        result,
        success: false,
        message: err.to_string(),
        detail: rejection_detail(&err, record, event),
    })
}

async fn storage_failure(
    state: &AppState,
    ctx: &ScanContext,
    record: Option<&TicketRecord>,
    err: anyhow::Error,
) -> Result<ScanOutcome, AppError> {
    warn!(error = %err, "scan aborted by storage failure");
    append_log(state, ctx, record, ScanResult::Invalid).await;
    state.metrics.record_scan(ScanResult::Invalid);
    Err(AppError::Internal(err))
}

async fn append_log(
    state: &AppState,
    ctx: &ScanContext,
    record: Option<&TicketRecord>,
    result: ScanResult,
) {
    let entry = ScanAttemptLog {
        ticket_id: record.map(|r| r.ticket_id().clone()),
        ticket_number: record.map(|r| r.ticket_number().clone()),
        scanned_by: ctx.actor.clone(),
        result,
        timestamp: ctx.now,
        device_info: ctx.device_info.clone(),
    };
    if let Err(err) = state.scan_logs.append(entry).await {
        warn!(result = result.as_str(), error = %err, "failed to append scan log");
    }
}

fn ticket_detail(record: &TicketRecord, event: Option<&EventInfo>) -> ScanDetail {
    ScanDetail {
        ticket_number: Some(record.ticket_number().clone()),
        ticket_type: Some(record.identity.ticket_type.clone()),
        attendee_name: record.attendee_name.clone(),
        owner_id: Some(record.identity.owner_id.clone()),
        event_id: Some(record.identity.event_id.clone()),
        event_name: event.map(|info| info.name.clone()),
        scan_count: Some(record.scan_count),
        ..ScanDetail::default()
    }
}

/// Operator-facing detail. Token failures and unauthorized actors get nothing
/// beyond the result itself.
fn rejection_detail(
    err: &TicketError,
    record: Option<&TicketRecord>,
    event: Option<&EventInfo>,
) -> ScanDetail {
    let base = || ScanDetail {
        ticket_number: record.map(|r| r.ticket_number().clone()),
        ..ScanDetail::default()
    };
    match err {
        TicketError::AlreadyUsed {
            checked_in_at,
            checked_in_by,
        } => ScanDetail {
            checked_in_at: *checked_in_at,
            checked_in_by: checked_in_by.clone(),
            ..base()
        },
        TicketError::WrongEvent {
            event_id,
            event_name,
        } => ScanDetail {
            event_id: Some(event_id.clone()),
            event_name: Some(event_name.clone()),
            ..base()
        },
        TicketError::TooEarly { opens_at } => ScanDetail {
            opens_at: Some(*opens_at),
            event_name: event.map(|info| info.name.clone()),
            ..base()
        },
        TicketError::TicketExpired { valid_until } => ScanDetail {
            valid_until: Some(*valid_until),
            ..base()
        },
        TicketError::Cancelled => base(),
        _ => ScanDetail::default(),
    }
}

/// Hours outside chrono's range collapse to no early window.
fn early_checkin_window(hours: i64) -> Duration {
    Duration::try_hours(hours)
        .filter(|window| *window >= Duration::zero())
        .unwrap_or_else(Duration::zero)
}
