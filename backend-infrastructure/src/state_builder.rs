use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use backend_application::ops::{InFlightRegistry, TicketNumberAllocator};
use backend_application::{AppState, Metrics, QrCodec};
use backend_domain::ports::TicketRenderer;
use backend_domain::{EventCatalog, RuntimeConfig};

use crate::repositories::{
    InMemoryBookingRepository, InMemoryEventDirectory, InMemoryScanLogRepository,
    InMemoryTicketRepository, InMemoryWebhookLedger,
};
use crate::services::{GzipBundleWriter, SvgTicketRenderer};

/// Wires an `AppState` over the in-memory stores with the default renderer.
pub fn build_in_memory_state(config: RuntimeConfig, catalog: EventCatalog) -> anyhow::Result<AppState> {
    build_state_with_renderer(config, catalog, Arc::new(SvgTicketRenderer::default()))
}

pub fn build_state_with_renderer(
    config: RuntimeConfig,
    catalog: EventCatalog,
    renderer: Arc<dyn TicketRenderer>,
) -> anyhow::Result<AppState> {
    let codec = QrCodec::from_config(&config).map_err(|err| anyhow!("qr codec: {}", err))?;
    let inflight_ttl = Duration::from_secs(config.inflight_ttl_seconds.max(1));
    Ok(AppState {
        codec: Arc::new(codec),
        tickets: Arc::new(InMemoryTicketRepository::new()),
        scan_logs: Arc::new(InMemoryScanLogRepository::new()),
        webhook_ledger: Arc::new(InMemoryWebhookLedger::new()),
        events: Arc::new(InMemoryEventDirectory::from_catalog(catalog)),
        bookings: Arc::new(InMemoryBookingRepository::new()),
        renderer,
        archive: Arc::new(GzipBundleWriter),
        inflight: Arc::new(InFlightRegistry::new(inflight_ttl)),
        ticket_numbers: Arc::new(TicketNumberAllocator::default()),
        metrics: Arc::new(Metrics::default()),
        config,
    })
}
