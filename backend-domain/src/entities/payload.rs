// QR payload schema
// Tagged by format so the codec can reject shapes it does not know

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::TicketIdentity;
use crate::value_objects::{TicketId, TicketNumber};

pub const TICKET_PAYLOAD_V1: &str = "ticket.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format")]
pub enum TicketPayload {
    #[serde(rename = "ticket.v1")]
    V1(TicketClaims),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClaims {
    pub ticket_id: TicketId,
    pub ticket_number: TicketNumber,
    pub event_id: String,
    pub booking_id: String,
    pub owner_id: String,
    pub ticket_type: String,
    pub event_date: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    /// Keyed digest over the identity fields; re-derived against the stored record.
    pub verification_id: String,
}

impl TicketClaims {
    pub fn from_identity(identity: &TicketIdentity, verification_id: String) -> Self {
        Self {
            ticket_id: identity.ticket_id.clone(),
            ticket_number: identity.ticket_number.clone(),
            event_id: identity.event_id.clone(),
            booking_id: identity.booking_id.clone(),
            owner_id: identity.owner_id.clone(),
            ticket_type: identity.ticket_type.clone(),
            event_date: identity.event_date,
            valid_until: identity.valid_until,
            verification_id,
        }
    }
}

impl TicketPayload {
    pub fn format(&self) -> &'static str {
        match self {
            TicketPayload::V1(_) => TICKET_PAYLOAD_V1,
        }
    }

    pub fn claims(&self) -> &TicketClaims {
        match self {
            TicketPayload::V1(claims) => claims,
        }
    }

    pub fn ticket_number(&self) -> &TicketNumber {
        &self.claims().ticket_number
    }
}
