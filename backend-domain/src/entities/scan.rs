// Scan entities
// The attempt log is append-only; every engine branch writes exactly one entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ScanResult, TicketId, TicketNumber};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAttemptLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<TicketId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<TicketNumber>,
    pub scanned_by: String,
    pub result: ScanResult,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub token: String,
    #[serde(default)]
    pub scanned_by: String,
    #[serde(default)]
    pub expected_event_id: Option<String>,
    #[serde(default)]
    pub device_info: Option<String>,
}

/// Operator-facing result of one scan. Rejections are values, not errors.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub result: ScanResult,
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub detail: ScanDetail,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<TicketNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opens_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_count: Option<u32>,
}
