// Check-in rules applied after a ticket has been found and its token bound to it

use chrono::{DateTime, Duration, Utc};

use crate::entities::{EventInfo, StaffPermission, TicketRecord};
use crate::errors::TicketError;
use crate::value_objects::TicketStatus;

/// Organizer, or staff holding an explicit scan grant for this event.
pub fn authorize_scanner(
    actor: &str,
    event: Option<&EventInfo>,
    permission: Option<&StaffPermission>,
) -> Result<(), TicketError> {
    let actor = actor.trim();
    if actor.is_empty() {
        return Err(TicketError::Unauthorized);
    }
    let is_organizer = event
        .map(|info| info.organizer_id == actor)
        .unwrap_or(false);
    let is_scanner = permission
        .map(|grant| grant.user_id == actor && grant.can_scan)
        .unwrap_or(false);
    if is_organizer || is_scanner {
        Ok(())
    } else {
        Err(TicketError::Unauthorized)
    }
}

pub fn check_event_match(
    record: &TicketRecord,
    event: Option<&EventInfo>,
    expected_event_id: Option<&str>,
) -> Result<(), TicketError> {
    let Some(expected) = expected_event_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(());
    };
    if expected == record.identity.event_id {
        return Ok(());
    }
    Err(TicketError::WrongEvent {
        event_id: record.identity.event_id.clone(),
        event_name: event
            .map(|info| info.name.clone())
            .unwrap_or_else(|| record.identity.event_id.clone()),
    })
}

/// Status checks in order: used, cancelled, expired, too early.
pub fn check_status(
    record: &TicketRecord,
    event: Option<&EventInfo>,
    now: DateTime<Utc>,
    early_window: Duration,
) -> Result<(), TicketError> {
    match record.status {
        TicketStatus::Used => {
            return Err(TicketError::AlreadyUsed {
                checked_in_at: record.checked_in_at,
                checked_in_by: record.checked_in_by.clone(),
            })
        }
        TicketStatus::Cancelled => return Err(TicketError::Cancelled),
        TicketStatus::Expired => {
            return Err(TicketError::TicketExpired {
                valid_until: record.identity.valid_until,
            })
        }
        TicketStatus::Valid => {}
    }
    if now > record.identity.valid_until {
        return Err(TicketError::TicketExpired {
            valid_until: record.identity.valid_until,
        });
    }
    if let Some(opens_at) = check_in_opens_at(event, early_window) {
        if now < opens_at {
            return Err(TicketError::TooEarly { opens_at });
        }
    }
    Ok(())
}

pub fn check_in_opens_at(event: Option<&EventInfo>, early_window: Duration) -> Option<DateTime<Utc>> {
    event
        .and_then(|info| info.starts_at)
        .and_then(|starts_at| starts_at.checked_sub_signed(early_window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TicketIdentity;
    use crate::value_objects::{TicketId, TicketNumber};

    fn event(starts_at: Option<DateTime<Utc>>) -> EventInfo {
        EventInfo {
            event_id: "E1".to_string(),
            name: "Spring Gala".to_string(),
            organizer_id: "org-1".to_string(),
            starts_at,
            ticket_prefix: None,
        }
    }

    fn ticket(status: TicketStatus) -> TicketRecord {
        let now = Utc::now();
        let mut record = TicketRecord::new(
            TicketIdentity {
                ticket_id: TicketId("t-1".to_string()),
                event_id: "E1".to_string(),
                booking_id: "B1".to_string(),
                owner_id: "U1".to_string(),
                ticket_number: TicketNumber("SPR-1-AAAA".to_string()),
                ticket_type: "general".to_string(),
                event_date: now,
                valid_until: now + Duration::days(30),
            },
            "token".to_string(),
            None,
            now,
        );
        record.status = status;
        record
    }

    fn grant(user: &str, can_scan: bool) -> StaffPermission {
        StaffPermission {
            event_id: "E1".to_string(),
            user_id: user.to_string(),
            role: Some("door".to_string()),
            can_scan,
        }
    }

    #[test]
    fn organizer_and_scanning_staff_are_authorized() {
        let info = event(None);
        assert!(authorize_scanner("org-1", Some(&info), None).is_ok());
        assert!(authorize_scanner("staff-1", Some(&info), Some(&grant("staff-1", true))).is_ok());
    }

    #[test]
    fn staff_without_scan_grant_is_rejected() {
        let info = event(None);
        let err = authorize_scanner("staff-1", Some(&info), Some(&grant("staff-1", false)))
            .expect_err("no scan grant");
        assert_eq!(err, TicketError::Unauthorized);
        assert!(authorize_scanner("", Some(&info), None).is_err());
    }

    #[test]
    fn wrong_event_carries_actual_event_name() {
        let info = event(None);
        let err = check_event_match(&ticket(TicketStatus::Valid), Some(&info), Some("E2"))
            .expect_err("wrong event");
        match err {
            TicketError::WrongEvent { event_id, event_name } => {
                assert_eq!(event_id, "E1");
                assert_eq!(event_name, "Spring Gala");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(check_event_match(&ticket(TicketStatus::Valid), Some(&info), Some("E1")).is_ok());
        assert!(check_event_match(&ticket(TicketStatus::Valid), Some(&info), None).is_ok());
    }

    #[test]
    fn used_is_reported_before_other_checks() {
        let mut record = ticket(TicketStatus::Used);
        let at = Utc::now();
        record.checked_in_at = Some(at);
        record.checked_in_by = Some("staff-9".to_string());
        let err = check_status(&record, None, Utc::now(), Duration::hours(2)).expect_err("used");
        assert_eq!(
            err,
            TicketError::AlreadyUsed {
                checked_in_at: Some(at),
                checked_in_by: Some("staff-9".to_string()),
            }
        );
    }

    #[test]
    fn huge_early_window_does_not_overflow() {
        let starts_at = Utc::now() + Duration::hours(10);
        let info = event(Some(starts_at));
        let window = Duration::milliseconds(i64::MAX);
        assert_eq!(check_in_opens_at(Some(&info), window), None);
        assert!(check_status(&ticket(TicketStatus::Valid), Some(&info), Utc::now(), window).is_ok());
    }

    #[test]
    fn too_early_reports_opening_instant() {
        let starts_at = Utc::now() + Duration::hours(10);
        let info = event(Some(starts_at));
        let err = check_status(&ticket(TicketStatus::Valid), Some(&info), Utc::now(), Duration::hours(2))
            .expect_err("too early");
        assert_eq!(
            err,
            TicketError::TooEarly {
                opens_at: starts_at - Duration::hours(2)
            }
        );
        let soon = event(Some(Utc::now() + Duration::hours(1)));
        assert!(check_status(&ticket(TicketStatus::Valid), Some(&soon), Utc::now(), Duration::hours(2)).is_ok());
    }

    #[test]
    fn past_valid_until_is_expired() {
        let record = ticket(TicketStatus::Valid);
        let later = record.identity.valid_until + Duration::seconds(1);
        let err = check_status(&record, None, later, Duration::hours(2)).expect_err("expired");
        assert_eq!(err.scan_result(), crate::ScanResult::Expired);
        assert_eq!(
            check_status(&ticket(TicketStatus::Cancelled), None, Utc::now(), Duration::hours(2)),
            Err(TicketError::Cancelled)
        );
    }
}
