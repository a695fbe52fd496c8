// Webhook ledger processing status

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookProcessingStatus {
    Received,
    Processed,
    SignatureRejected,
    Ignored,
    Failed,
}

impl WebhookProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookProcessingStatus::Received => "received",
            WebhookProcessingStatus::Processed => "processed",
            WebhookProcessingStatus::SignatureRejected => "signature_rejected",
            WebhookProcessingStatus::Ignored => "ignored",
            WebhookProcessingStatus::Failed => "failed",
        }
    }
}
