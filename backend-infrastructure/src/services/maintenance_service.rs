use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::{error, info};

use backend_application::AppState;

const MAX_RETENTION_HOURS: u64 = 24 * 365 * 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub webhooks_purged: usize,
    pub inflight_purged: usize,
}

pub async fn schedule_maintenance(state: AppState) {
    let period = StdDuration::from_secs(state.config.maintenance_interval_seconds.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = run_maintenance(&state).await {
            error!("maintenance run failed: {}", err);
        }
    }
}

/// Purges ledger entries past retention and in-flight claims past their TTL.
pub async fn run_maintenance(state: &AppState) -> Result<MaintenanceReport> {
    let retention_hours = state.config.webhook_retention_hours.min(MAX_RETENTION_HOURS);
    let cutoff = Utc::now() - Duration::hours(retention_hours as i64);
    let report = MaintenanceReport {
        webhooks_purged: state.webhook_ledger.purge_before(cutoff).await?,
        inflight_purged: state.inflight.purge_expired().await,
    };
    if report.webhooks_purged > 0 || report.inflight_purged > 0 {
        info!(
            webhooks_purged = report.webhooks_purged,
            inflight_purged = report.inflight_purged,
            "maintenance purge"
        );
    }
    Ok(report)
}
