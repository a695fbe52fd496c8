// Ticket error taxonomy
// Every variant except StorageFailure is an expected outcome of normal operation

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::value_objects::ScanResult;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    #[error("invalid ticket")]
    InvalidToken,
    #[error("ticket failed verification")]
    TamperedToken,
    #[error("ticket code is too old")]
    ExpiredToken,
    #[error("ticket expired at {valid_until}")]
    TicketExpired { valid_until: DateTime<Utc> },
    #[error("{}", already_used_message(checked_in_at))]
    AlreadyUsed {
        checked_in_at: Option<DateTime<Utc>>,
        checked_in_by: Option<String>,
    },
    #[error("ticket has been cancelled")]
    Cancelled,
    #[error("ticket is for another event: {event_name}")]
    WrongEvent { event_id: String, event_name: String },
    #[error("not authorized to scan tickets for this event")]
    Unauthorized,
    #[error("check-in opens at {opens_at}")]
    TooEarly { opens_at: DateTime<Utc> },
    #[error("webhook already processed")]
    ReplayDetected,
    #[error("webhook signature mismatch")]
    SignatureMismatch,
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl TicketError {
    /// Scan log result for rejections the verification engine can produce.
    pub fn scan_result(&self) -> ScanResult {
        match self {
            TicketError::InvalidToken | TicketError::StorageFailure(_) => ScanResult::Invalid,
            // Webhook rejections never reach the scan log.
            TicketError::ReplayDetected | TicketError::SignatureMismatch => ScanResult::Invalid,
            TicketError::TamperedToken => ScanResult::Tampered,
            TicketError::ExpiredToken | TicketError::TicketExpired { .. } => ScanResult::Expired,
            TicketError::AlreadyUsed { .. } => ScanResult::AlreadyUsed,
            TicketError::Cancelled => ScanResult::Cancelled,
            TicketError::WrongEvent { .. } => ScanResult::WrongEvent,
            TicketError::Unauthorized => ScanResult::Unauthorized,
            TicketError::TooEarly { .. } => ScanResult::TooEarly,
        }
    }
}

fn already_used_message(checked_in_at: &Option<DateTime<Utc>>) -> String {
    match checked_in_at {
        Some(at) => format!("already checked in at {}", at.to_rfc3339()),
        None => "already checked in".to_string(),
    }
}

impl From<anyhow::Error> for TicketError {
    fn from(value: anyhow::Error) -> Self {
        TicketError::StorageFailure(value.to_string())
    }
}
