// Payment notification value objects

use serde::{Deserialize, Serialize};

/// Event types a payment notification can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEventType {
    Success,
    Failed,
    Pending,
    Refunded,
}

impl PaymentEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentEventType::Success => "success",
            PaymentEventType::Failed => "failed",
            PaymentEventType::Pending => "pending",
            PaymentEventType::Refunded => "refunded",
        }
    }

    /// Accepts the bare names plus the dotted `payment.<name>` form.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        let name = normalized
            .strip_prefix("payment.")
            .unwrap_or(normalized.as_str());
        match name {
            "success" | "succeeded" | "paid" => Some(PaymentEventType::Success),
            "failed" | "failure" => Some(PaymentEventType::Failed),
            "pending" => Some(PaymentEventType::Pending),
            "refunded" | "refund" => Some(PaymentEventType::Refunded),
            _ => None,
        }
    }

    /// Absolute payment state an event of this type settles a booking into.
    pub fn target_state(&self) -> PaymentState {
        match self {
            PaymentEventType::Success => PaymentState::Paid,
            PaymentEventType::Failed => PaymentState::Failed,
            PaymentEventType::Pending => PaymentState::Pending,
            PaymentEventType::Refunded => PaymentState::Refunded,
        }
    }

    /// Whether the booking's still-valid tickets must be cancelled.
    pub fn voids_tickets(&self) -> bool {
        matches!(self, PaymentEventType::Failed | PaymentEventType::Refunded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "pending",
            PaymentState::Paid => "paid",
            PaymentState::Failed => "failed",
            PaymentState::Refunded => "refunded",
        }
    }
}
