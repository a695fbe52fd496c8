use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::ScanResult;

#[derive(Debug, Default)]
pub struct Metrics {
    tickets_issued: AtomicU64,
    issue_failures: AtomicU64,
    scans: [AtomicU64; 9],
    webhooks_accepted: AtomicU64,
    webhooks_replayed: AtomicU64,
    webhooks_signature_rejected: AtomicU64,
    artifacts_rendered: AtomicU64,
    render_persistence_errors: AtomicU64,
}

impl Metrics {
    pub fn record_issued(&self, count: usize) {
        self.tickets_issued.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_issue_failures(&self, count: usize) {
        self.issue_failures.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_scan(&self, result: ScanResult) {
        self.scans[scan_slot(result)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn scan_count(&self, result: ScanResult) -> u64 {
        self.scans[scan_slot(result)].load(Ordering::Relaxed)
    }

    pub fn record_webhook_accepted(&self) {
        self.webhooks_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_webhook_replayed(&self) {
        self.webhooks_replayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_webhook_signature_rejected(&self) {
        self.webhooks_signature_rejected
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rendered(&self, count: usize, persistence_errors: usize) {
        self.artifacts_rendered
            .fetch_add(count as u64, Ordering::Relaxed);
        self.render_persistence_errors
            .fetch_add(persistence_errors as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "# TYPE ticketgate_tickets_issued_total counter\n\
ticketgate_tickets_issued_total {}\n\
# TYPE ticketgate_issue_failures_total counter\n\
ticketgate_issue_failures_total {}\n\
# TYPE ticketgate_scans_total counter\n",
            self.tickets_issued.load(Ordering::Relaxed),
            self.issue_failures.load(Ordering::Relaxed),
        );
        for result in ScanResult::ALL {
            let _ = writeln!(
                out,
                "ticketgate_scans_total{{result=\"{}\"}} {}",
                result.as_str(),
                self.scan_count(result)
            );
        }
        let _ = write!(
            out,
            "# TYPE ticketgate_webhooks_accepted_total counter\n\
ticketgate_webhooks_accepted_total {}\n\
# TYPE ticketgate_webhooks_replayed_total counter\n\
ticketgate_webhooks_replayed_total {}\n\
# TYPE ticketgate_webhooks_signature_rejected_total counter\n\
ticketgate_webhooks_signature_rejected_total {}\n\
# TYPE ticketgate_artifacts_rendered_total counter\n\
ticketgate_artifacts_rendered_total {}\n\
# TYPE ticketgate_render_persistence_errors_total counter\n\
ticketgate_render_persistence_errors_total {}\n",
            self.webhooks_accepted.load(Ordering::Relaxed),
            self.webhooks_replayed.load(Ordering::Relaxed),
            self.webhooks_signature_rejected.load(Ordering::Relaxed),
            self.artifacts_rendered.load(Ordering::Relaxed),
            self.render_persistence_errors.load(Ordering::Relaxed),
        );
        out
    }
}

fn scan_slot(result: ScanResult) -> usize {
    ScanResult::ALL
        .iter()
        .position(|candidate| *candidate == result)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_output_labels_scans_by_result() {
        let metrics = Metrics::default();
        metrics.record_scan(ScanResult::Success);
        metrics.record_scan(ScanResult::AlreadyUsed);
        metrics.record_scan(ScanResult::AlreadyUsed);
        let text = metrics.render_prometheus();
        assert!(text.contains("ticketgate_scans_total{result=\"success\"} 1"));
        assert!(text.contains("ticketgate_scans_total{result=\"already_used\"} 2"));
        assert!(text.contains("ticketgate_scans_total{result=\"tampered\"} 0"));
    }
}
