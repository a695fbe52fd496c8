#![allow(dead_code)]

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use backend_application::AppState;
use backend_domain::ports::{ScanLogRepository, TicketRepository};
use backend_domain::{
    EventCatalog, EventInfo, IssueTicketRequest, RuntimeConfig, ScanRequest, StaffPermission,
    TicketChange, TicketId, TicketNumber, TicketRecord, TicketStatus,
};
use backend_infrastructure::{
    build_in_memory_state, InMemoryScanLogRepository, InMemoryTicketRepository,
};

pub const ORGANIZER: &str = "org-1";
pub const STAFF: &str = "staff-1";

pub fn config() -> RuntimeConfig {
    RuntimeConfig {
        qr_secret: "scenario-qr-secret-0123456789".to_string(),
        webhook_secret: "scenario-webhook-secret-0123".to_string(),
        bulk_batch_delay_ms: 1,
        ..RuntimeConfig::default()
    }
}

pub fn catalog() -> EventCatalog {
    EventCatalog {
        events: vec![
            EventInfo {
                event_id: "E1".to_string(),
                name: "Spring Gala".to_string(),
                organizer_id: ORGANIZER.to_string(),
                starts_at: Some(Utc::now() - Duration::hours(1)),
                ticket_prefix: Some("GAL".to_string()),
            },
            EventInfo {
                event_id: "E2".to_string(),
                name: "Winter Ball".to_string(),
                organizer_id: "org-2".to_string(),
                starts_at: None,
                ticket_prefix: None,
            },
            EventInfo {
                event_id: "E3".to_string(),
                name: "Summer Fest".to_string(),
                organizer_id: ORGANIZER.to_string(),
                starts_at: Some(Utc::now() + Duration::days(10)),
                ticket_prefix: None,
            },
        ],
        staff: vec![
            StaffPermission {
                event_id: "E1".to_string(),
                user_id: STAFF.to_string(),
                role: Some("door".to_string()),
                can_scan: true,
            },
            StaffPermission {
                event_id: "E1".to_string(),
                user_id: "usher-1".to_string(),
                role: Some("usher".to_string()),
                can_scan: false,
            },
        ],
    }
}

pub fn state() -> AppState {
    build_in_memory_state(config(), catalog()).expect("state")
}

pub fn with_tickets(mut state: AppState, tickets: Arc<dyn TicketRepository>) -> AppState {
    state.tickets = tickets;
    state
}

/// State whose scan audit trail stays readable through the returned handle.
pub fn with_scan_logs(mut state: AppState) -> (AppState, Arc<InMemoryScanLogRepository>) {
    let logs = Arc::new(InMemoryScanLogRepository::new());
    state.scan_logs = logs.clone() as Arc<dyn ScanLogRepository>;
    (state, logs)
}

pub fn issue_request(event_id: &str, booking_id: &str) -> IssueTicketRequest {
    IssueTicketRequest {
        owner_id: "user-9".to_string(),
        event_id: event_id.to_string(),
        booking_id: booking_id.to_string(),
        ticket_type: "general".to_string(),
        event_date: Utc::now() + Duration::days(1),
        attendee_name: Some("Ada Lovelace".to_string()),
    }
}

pub fn scan(token: &str, actor: &str, expected_event_id: Option<&str>) -> ScanRequest {
    ScanRequest {
        token: token.to_string(),
        scanned_by: actor.to_string(),
        expected_event_id: expected_event_id.map(str::to_string),
        device_info: Some("gate-a".to_string()),
    }
}

/// Ticket store whose `insert` fails for the given 1-based call numbers.
pub struct FlakyTicketRepository {
    inner: InMemoryTicketRepository,
    failing_calls: RangeInclusive<usize>,
    calls: AtomicUsize,
}

impl FlakyTicketRepository {
    pub fn new(failing_calls: RangeInclusive<usize>) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryTicketRepository::new(),
            failing_calls,
            calls: AtomicUsize::new(0),
        })
    }

    pub async fn stored(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl TicketRepository for FlakyTicketRepository {
    async fn insert(&self, record: TicketRecord) -> anyhow::Result<bool> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_calls.contains(&call) {
            return Err(anyhow!("write rejected for call {}", call));
        }
        self.inner.insert(record).await
    }

    async fn get_by_number(&self, number: &TicketNumber) -> anyhow::Result<Option<TicketRecord>> {
        self.inner.get_by_number(number).await
    }

    async fn get_by_id(&self, ticket_id: &TicketId) -> anyhow::Result<Option<TicketRecord>> {
        self.inner.get_by_id(ticket_id).await
    }

    async fn list_by_booking(&self, booking_id: &str) -> anyhow::Result<Vec<TicketRecord>> {
        self.inner.list_by_booking(booking_id).await
    }

    async fn conditional_transition(
        &self,
        ticket_id: &TicketId,
        expected: TicketStatus,
        change: TicketChange,
    ) -> anyhow::Result<bool> {
        self.inner
            .conditional_transition(ticket_id, expected, change)
            .await
    }

    async fn record_scan_attempt(
        &self,
        ticket_id: &TicketId,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.inner.record_scan_attempt(ticket_id, at).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.inner.ping().await
    }
}
