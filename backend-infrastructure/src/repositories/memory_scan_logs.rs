use async_trait::async_trait;
use tokio::sync::RwLock;

use backend_domain::ports::ScanLogRepository;
use backend_domain::{ScanAttemptLog, TicketId};

/// Append-only scan audit trail.
#[derive(Default)]
pub struct InMemoryScanLogRepository {
    entries: RwLock<Vec<ScanAttemptLog>>,
}

impl InMemoryScanLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<ScanAttemptLog> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl ScanLogRepository for InMemoryScanLogRepository {
    async fn append(&self, entry: ScanAttemptLog) -> anyhow::Result<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list_for_ticket(
        &self,
        ticket_id: &TicketId,
        limit: usize,
    ) -> anyhow::Result<Vec<ScanAttemptLog>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| entry.ticket_id.as_ref() == Some(ticket_id))
            .take(limit)
            .cloned()
            .collect())
    }
}
