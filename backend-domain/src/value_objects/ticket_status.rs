// Ticket status value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Valid,
    Used,
    Cancelled,
    Expired,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Valid => "valid",
            TicketStatus::Used => "used",
            TicketStatus::Cancelled => "cancelled",
            TicketStatus::Expired => "expired",
        }
    }

    /// Only `valid` may leave its state; every other status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TicketStatus::Valid)
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Valid, TicketStatus::Used)
                | (TicketStatus::Valid, TicketStatus::Cancelled)
                | (TicketStatus::Valid, TicketStatus::Expired)
        )
    }
}

impl From<&str> for TicketStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "valid" => TicketStatus::Valid,
            "used" => TicketStatus::Used,
            "expired" => TicketStatus::Expired,
            _ => TicketStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_valid_leaves_its_state() {
        let all = [
            TicketStatus::Valid,
            TicketStatus::Used,
            TicketStatus::Cancelled,
            TicketStatus::Expired,
        ];
        for from in all {
            for to in all {
                if from.is_terminal() {
                    assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
                }
            }
        }
        assert!(TicketStatus::Valid.can_transition_to(TicketStatus::Used));
        assert!(!TicketStatus::Valid.can_transition_to(TicketStatus::Valid));
    }

    #[test]
    fn unknown_status_text_is_treated_as_cancelled() {
        assert_eq!(TicketStatus::from("USED"), TicketStatus::Used);
        assert_eq!(TicketStatus::from("garbage"), TicketStatus::Cancelled);
    }
}
