// Scan result value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanResult {
    Success,
    AlreadyUsed,
    Invalid,
    Expired,
    Cancelled,
    WrongEvent,
    Unauthorized,
    Tampered,
    TooEarly,
}

impl ScanResult {
    pub const ALL: [ScanResult; 9] = [
        ScanResult::Success,
        ScanResult::AlreadyUsed,
        ScanResult::Invalid,
        ScanResult::Expired,
        ScanResult::Cancelled,
        ScanResult::WrongEvent,
        ScanResult::Unauthorized,
        ScanResult::Tampered,
        ScanResult::TooEarly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanResult::Success => "success",
            ScanResult::AlreadyUsed => "already_used",
            ScanResult::Invalid => "invalid",
            ScanResult::Expired => "expired",
            ScanResult::Cancelled => "cancelled",
            ScanResult::WrongEvent => "wrong_event",
            ScanResult::Unauthorized => "unauthorized",
            ScanResult::Tampered => "tampered",
            ScanResult::TooEarly => "too_early",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScanResult::Success)
    }
}
