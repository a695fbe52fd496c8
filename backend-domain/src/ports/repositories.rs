use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    BookingPayment, EventInfo, ScanAttemptLog, StaffPermission, TicketChange, TicketRecord,
    WebhookCompositeId, WebhookRecord,
};
use crate::value_objects::{TicketId, TicketNumber, TicketStatus, WebhookProcessingStatus};

/// Durable ticket storage, indexed by both ticket id and ticket number.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Returns false when either index key is already taken.
    async fn insert(&self, record: TicketRecord) -> anyhow::Result<bool>;
    async fn get_by_number(&self, number: &TicketNumber) -> anyhow::Result<Option<TicketRecord>>;
    async fn get_by_id(&self, ticket_id: &TicketId) -> anyhow::Result<Option<TicketRecord>>;
    async fn list_by_booking(&self, booking_id: &str) -> anyhow::Result<Vec<TicketRecord>>;
    /// Applies `change` only if the stored status still equals `expected`.
    async fn conditional_transition(
        &self,
        ticket_id: &TicketId,
        expected: TicketStatus,
        change: TicketChange,
    ) -> anyhow::Result<bool>;
    /// Counts a scan attempt that did not change status.
    async fn record_scan_attempt(&self, ticket_id: &TicketId, at: DateTime<Utc>)
        -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ScanLogRepository: Send + Sync {
    async fn append(&self, entry: ScanAttemptLog) -> anyhow::Result<()>;
    async fn list_for_ticket(
        &self,
        ticket_id: &TicketId,
        limit: usize,
    ) -> anyhow::Result<Vec<ScanAttemptLog>>;
}

/// Dedup ledger for inbound payment notifications.
#[async_trait]
pub trait WebhookLedger: Send + Sync {
    /// Atomic check-and-insert; true means newly inserted.
    async fn check_and_insert(&self, record: WebhookRecord) -> anyhow::Result<bool>;
    async fn mark_status(
        &self,
        composite_id: &WebhookCompositeId,
        status: WebhookProcessingStatus,
    ) -> anyhow::Result<()>;
    async fn get(&self, composite_id: &WebhookCompositeId) -> anyhow::Result<Option<WebhookRecord>>;
    /// Drops entries received before `cutoff`, returning how many were removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<usize>;
}

#[async_trait]
pub trait EventDirectory: Send + Sync {
    async fn get_event(&self, event_id: &str) -> anyhow::Result<Option<EventInfo>>;
    async fn staff_permission(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> anyhow::Result<Option<StaffPermission>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Sets the absolute payment state for an order.
    async fn upsert_payment(&self, payment: BookingPayment) -> anyhow::Result<()>;
    async fn get_payment(&self, order_id: &str) -> anyhow::Result<Option<BookingPayment>>;
}
