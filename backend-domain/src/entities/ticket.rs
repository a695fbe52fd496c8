// Ticket entities
// Identity is fixed at issuance; the record is the mutable projection held by the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{TicketId, TicketNumber, TicketStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketIdentity {
    pub ticket_id: TicketId,
    pub event_id: String,
    pub booking_id: String,
    pub owner_id: String,
    pub ticket_number: TicketNumber,
    pub ticket_type: String,
    pub event_date: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub identity: TicketIdentity,
    pub status: TicketStatus,
    pub qr_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_name: Option<String>,
    pub issued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_by: Option<String>,
    pub scan_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_scanned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scanned_at: Option<DateTime<Utc>>,
}

impl TicketRecord {
    pub fn new(
        identity: TicketIdentity,
        qr_token: String,
        attendee_name: Option<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            status: TicketStatus::Valid,
            qr_token,
            attendee_name,
            issued_at,
            checked_in_at: None,
            checked_in_by: None,
            scan_count: 0,
            first_scanned_at: None,
            last_scanned_at: None,
        }
    }

    pub fn ticket_id(&self) -> &TicketId {
        &self.identity.ticket_id
    }

    pub fn ticket_number(&self) -> &TicketNumber {
        &self.identity.ticket_number
    }

    /// Stamps one scan attempt onto the record.
    pub fn stamp_scan(&mut self, at: DateTime<Utc>) {
        self.scan_count = self.scan_count.saturating_add(1);
        if self.first_scanned_at.is_none() {
            self.first_scanned_at = Some(at);
        }
        self.last_scanned_at = Some(at);
    }

    /// Applies a change whose precondition has already been checked by the store.
    pub fn apply(&mut self, change: &TicketChange) {
        self.status = change.status;
        if let Some(at) = change.checked_in_at {
            self.checked_in_at = Some(at);
        }
        if let Some(actor) = &change.checked_in_by {
            self.checked_in_by = Some(actor.clone());
        }
        if let Some(at) = change.scanned_at {
            self.stamp_scan(at);
        }
    }
}

/// Field set written by a conditional status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketChange {
    pub status: TicketStatus,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by: Option<String>,
    /// When set, the transition also counts as a scan attempt.
    pub scanned_at: Option<DateTime<Utc>>,
}

impl TicketChange {
    pub fn check_in(actor: &str, at: DateTime<Utc>) -> Self {
        Self {
            status: TicketStatus::Used,
            checked_in_at: Some(at),
            checked_in_by: Some(actor.to_string()),
            scanned_at: Some(at),
        }
    }

    pub fn cancel() -> Self {
        Self {
            status: TicketStatus::Cancelled,
            checked_in_at: None,
            checked_in_by: None,
            scanned_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record() -> TicketRecord {
        let now = Utc::now();
        TicketRecord::new(
            TicketIdentity {
                ticket_id: TicketId("t-1".to_string()),
                event_id: "E1".to_string(),
                booking_id: "B1".to_string(),
                owner_id: "U1".to_string(),
                ticket_number: TicketNumber("CON-ABC-1234".to_string()),
                ticket_type: "general".to_string(),
                event_date: now,
                valid_until: now + Duration::days(1),
            },
            "token".to_string(),
            None,
            now,
        )
    }

    #[test]
    fn stamp_scan_keeps_first_timestamp() {
        let mut ticket = record();
        let first = Utc::now();
        let second = first + Duration::seconds(5);
        ticket.stamp_scan(first);
        ticket.stamp_scan(second);
        assert_eq!(ticket.scan_count, 2);
        assert_eq!(ticket.first_scanned_at, Some(first));
        assert_eq!(ticket.last_scanned_at, Some(second));
    }

    #[test]
    fn check_in_change_marks_used_and_counts_scan() {
        let mut ticket = record();
        let at = Utc::now();
        ticket.apply(&TicketChange::check_in("staff-1", at));
        assert_eq!(ticket.status, TicketStatus::Used);
        assert_eq!(ticket.checked_in_by.as_deref(), Some("staff-1"));
        assert_eq!(ticket.checked_in_at, Some(at));
        assert_eq!(ticket.scan_count, 1);
    }
}
