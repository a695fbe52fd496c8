// Payment webhook handling
//
// Admission (dedup ledger check-and-insert) runs before signature
// verification, and both run before any business effect.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::security::{constant_time_str_eq, sha256_hex, sign_hmac_sha256};
use crate::{AppError, AppState};
use backend_domain::{
    BookingPayment, PaymentEventType, PaymentNotification, ReplayReason, TicketChange,
    TicketStatus, WebhookAdmission, WebhookCompositeId, WebhookProcessingStatus, WebhookReceipt,
    WebhookRecord,
};

#[derive(Debug, Clone)]
pub enum WebhookOutcome {
    Processed(WebhookReceipt),
    Ignored(WebhookReceipt),
    Replay(ReplayReason),
    SignatureRejected,
}

pub async fn handle_payment_webhook(
    state: &AppState,
    raw: serde_json::Value,
) -> Result<WebhookOutcome, AppError> {
    let notification: PaymentNotification = serde_json::from_value(raw.clone())
        .map_err(|err| AppError::BadRequest(format!("invalid payment notification: {}", err)))?;
    if notification.order_id.trim().is_empty() || notification.event_type.trim().is_empty() {
        return Err(AppError::BadRequest(
            "order_id and event_type are required".to_string(),
        ));
    }
    let received_at = Utc::now();

    let composite_id = match admit(state, &notification, raw, received_at).await {
        WebhookAdmission::Accepted(composite_id) => composite_id,
        WebhookAdmission::Rejected(reason) => {
            state.metrics.record_webhook_replayed();
            warn!(
                order_id = %notification.order_id,
                event_type = %notification.event_type,
                reason = ?reason,
                "payment webhook rejected as replay"
            );
            return Ok(WebhookOutcome::Replay(reason));
        }
    };

    if !verify_signature(&state.config.webhook_secret, &notification) {
        state.metrics.record_webhook_signature_rejected();
        warn!(
            order_id = %notification.order_id,
            event_type = %notification.event_type,
            "payment webhook signature mismatch"
        );
        mark(state, &composite_id, WebhookProcessingStatus::SignatureRejected).await;
        return Ok(WebhookOutcome::SignatureRejected);
    }
    state.metrics.record_webhook_accepted();

    let Some(kind) = PaymentEventType::parse(&notification.event_type) else {
        mark(state, &composite_id, WebhookProcessingStatus::Ignored).await;
        info!(event_type = %notification.event_type, "payment webhook event type ignored");
        return Ok(WebhookOutcome::Ignored(WebhookReceipt {
            status: WebhookProcessingStatus::Ignored,
            order_id: notification.order_id,
            event_type: notification.event_type,
            message: "event type not handled".to_string(),
            tickets_cancelled: None,
        }));
    };

    match apply_payment_effect(state, &notification.order_id, kind, received_at).await {
        Ok(cancelled) => {
            mark(state, &composite_id, WebhookProcessingStatus::Processed).await;
            info!(
                order_id = %notification.order_id,
                event_type = kind.as_str(),
                tickets_cancelled = cancelled,
                "payment webhook processed"
            );
            Ok(WebhookOutcome::Processed(WebhookReceipt {
                status: WebhookProcessingStatus::Processed,
                order_id: notification.order_id,
                event_type: kind.as_str().to_string(),
                message: format!("booking marked {}", kind.target_state().as_str()),
                tickets_cancelled: kind.voids_tickets().then_some(cancelled),
            }))
        }
        Err(err) => {
            mark(state, &composite_id, WebhookProcessingStatus::Failed).await;
            Err(AppError::Internal(err))
        }
    }
}

/// Check-and-insert into the dedup ledger. A ledger that cannot answer is
/// treated as a replay.
pub async fn admit(
    state: &AppState,
    notification: &PaymentNotification,
    raw: serde_json::Value,
    received_at: DateTime<Utc>,
) -> WebhookAdmission {
    let composite_id = composite_id(notification, received_at);
    let record = WebhookRecord {
        composite_id: composite_id.clone(),
        raw_event_data: raw,
        received_at,
        processing_status: WebhookProcessingStatus::Received,
    };
    match state.webhook_ledger.check_and_insert(record).await {
        Ok(true) => WebhookAdmission::Accepted(composite_id),
        Ok(false) => WebhookAdmission::Rejected(ReplayReason::Duplicate),
        Err(err) => {
            warn!(error = %err, key = %composite_id.key(), "webhook ledger unavailable, rejecting");
            WebhookAdmission::Rejected(ReplayReason::LedgerUnavailable)
        }
    }
}

pub fn composite_id(
    notification: &PaymentNotification,
    received_at: DateTime<Utc>,
) -> WebhookCompositeId {
    let order_id = notification.order_id.trim().to_string();
    let event_type = notification.event_type.trim().to_string();
    let webhook_id = notification
        .webhook_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "{}:{}:{}",
                order_id,
                event_type,
                received_at.timestamp_millis()
            )
        });
    WebhookCompositeId {
        webhook_id,
        event_type,
        order_id,
        signature_hash: sha256_hex(notification.signature.trim().as_bytes()),
    }
}

pub fn signing_payload(notification: &PaymentNotification) -> String {
    format!(
        "{}|{}|{}|{}",
        notification.order_id.trim(),
        notification.event_type.trim(),
        notification.status.as_deref().unwrap_or("").trim(),
        notification.amount_text()
    )
}

pub fn expected_signature(secret: &str, notification: &PaymentNotification) -> String {
    sign_hmac_sha256(secret.as_bytes(), signing_payload(notification).as_bytes())
}

pub fn verify_signature(secret: &str, notification: &PaymentNotification) -> bool {
    let provided = notification.signature.trim().to_ascii_lowercase();
    !provided.is_empty() && constant_time_str_eq(&provided, &expected_signature(secret, notification))
}

/// Sets the absolute payment state of the order. Failed and refunded
/// payments cancel the booking's tickets that are still valid.
async fn apply_payment_effect(
    state: &AppState,
    order_id: &str,
    kind: PaymentEventType,
    at: DateTime<Utc>,
) -> anyhow::Result<usize> {
    state
        .bookings
        .upsert_payment(BookingPayment {
            order_id: order_id.trim().to_string(),
            state: kind.target_state(),
            last_event_type: kind,
            updated_at: at,
        })
        .await?;

    if !kind.voids_tickets() {
        return Ok(0);
    }
    let mut cancelled = 0;
    for ticket in state.tickets.list_by_booking(order_id.trim()).await? {
        if ticket.status != TicketStatus::Valid {
            continue;
        }
        if state
            .tickets
            .conditional_transition(ticket.ticket_id(), TicketStatus::Valid, TicketChange::cancel())
            .await?
        {
            cancelled += 1;
        }
    }
    Ok(cancelled)
}

async fn mark(state: &AppState, composite_id: &WebhookCompositeId, status: WebhookProcessingStatus) {
    if let Err(err) = state.webhook_ledger.mark_status(composite_id, status).await {
        warn!(key = %composite_id.key(), error = %err, "failed to update webhook status");
    }
}
