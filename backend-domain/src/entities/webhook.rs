// Payment webhook entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::WebhookProcessingStatus;

/// Inbound payment notification as posted by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    #[serde(default, alias = "webhookId")]
    pub webhook_id: Option<String>,
    #[serde(alias = "eventType", alias = "eventId")]
    pub event_type: String,
    #[serde(alias = "orderId")]
    pub order_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub signature: String,
}

impl PaymentNotification {
    /// Text of the amount exactly as the signature covers it.
    pub fn amount_text(&self) -> String {
        match &self.amount {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Multi-field key identifying one delivery for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebhookCompositeId {
    pub webhook_id: String,
    pub event_type: String,
    pub order_id: String,
    pub signature_hash: String,
}

impl WebhookCompositeId {
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.webhook_id, self.event_type, self.order_id, self.signature_hash
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRecord {
    pub composite_id: WebhookCompositeId,
    pub raw_event_data: serde_json::Value,
    pub received_at: DateTime<Utc>,
    pub processing_status: WebhookProcessingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayReason {
    /// The composite identity is already in the ledger.
    Duplicate,
    /// The ledger could not be consulted; rejected fail-secure.
    LedgerUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAdmission {
    Accepted(WebhookCompositeId),
    Rejected(ReplayReason),
}

/// Body returned to the gateway once a delivery is handled.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookReceipt {
    pub status: WebhookProcessingStatus,
    pub order_id: String,
    pub event_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets_cancelled: Option<usize>,
}
