use std::sync::Arc;

use backend_domain::ports::{
    ArchiveWriter, BookingRepository, EventDirectory, ScanLogRepository, TicketRenderer,
    TicketRepository, WebhookLedger,
};
use backend_domain::RuntimeConfig;

use crate::ops::{InFlightRegistry, TicketNumberAllocator};
use crate::{Metrics, QrCodec};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub codec: Arc<QrCodec>,
    pub tickets: Arc<dyn TicketRepository>,
    pub scan_logs: Arc<dyn ScanLogRepository>,
    pub webhook_ledger: Arc<dyn WebhookLedger>,
    pub events: Arc<dyn EventDirectory>,
    pub bookings: Arc<dyn BookingRepository>,
    pub renderer: Arc<dyn TicketRenderer>,
    pub archive: Arc<dyn ArchiveWriter>,
    pub inflight: Arc<InFlightRegistry>,
    pub ticket_numbers: Arc<TicketNumberAllocator>,
    pub metrics: Arc<Metrics>,
}
