// Issuance and bulk pipeline DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::TicketRecord;
use crate::value_objects::TicketNumber;

#[derive(Debug, Clone, Deserialize)]
pub struct IssueTicketRequest {
    pub owner_id: String,
    pub event_id: String,
    pub booking_id: String,
    pub ticket_type: String,
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub attendee_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkIssueRequest {
    pub event_id: String,
    pub owner_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    pub ticket_type: String,
    pub event_date: DateTime<Utc>,
    pub quantity: i64,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub attendee_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueFailure {
    /// 1-based position within the request.
    pub sequence: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkIssueReport {
    pub requested: u32,
    pub batches: u32,
    pub tickets: Vec<TicketRecord>,
    pub failures: Vec<IssueFailure>,
}

/// Outcome for one item of the bulk rendering pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderItemOutcome {
    Generated {
        sequence: u32,
        ticket_number: TicketNumber,
    },
    /// Artifact produced, bookkeeping write failed. Still counted as generated.
    PartialSuccess {
        sequence: u32,
        ticket_number: TicketNumber,
        secondary_error: String,
    },
    Failed {
        sequence: u32,
        reason: String,
    },
}

impl RenderItemOutcome {
    pub fn is_generated(&self) -> bool {
        !matches!(self, RenderItemOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkRenderReport {
    pub requested: u32,
    pub batch_size: usize,
    pub batches: u32,
    pub generated: u32,
    /// Items never attempted because the wall-clock budget ran out.
    pub skipped: u32,
    pub items: Vec<RenderItemOutcome>,
    #[serde(skip)]
    pub archive: Vec<u8>,
}

impl BulkRenderReport {
    pub fn persistence_errors(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, RenderItemOutcome::PartialSuccess { .. }))
            .count()
    }
}

/// One rendered file destined for the download archive.
#[derive(Debug, Clone)]
pub struct TicketArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
