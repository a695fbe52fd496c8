use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use backend_domain::ports::WebhookLedger;
use backend_domain::{WebhookCompositeId, WebhookProcessingStatus, WebhookRecord};

/// Dedup ledger keyed by the composite webhook identity. Check and insert
/// happen under one lock acquisition.
#[derive(Default)]
pub struct InMemoryWebhookLedger {
    entries: Mutex<HashMap<String, WebhookRecord>>,
}

impl InMemoryWebhookLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl WebhookLedger for InMemoryWebhookLedger {
    async fn check_and_insert(&self, record: WebhookRecord) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock().await;
        let key = record.composite_id.key();
        match entries.get(&key) {
            // Failed deliveries may be redelivered; every effect sets absolute state.
            Some(existing) if existing.processing_status == WebhookProcessingStatus::Failed => {}
            Some(_) => return Ok(false),
            None => {}
        }
        entries.insert(key, record);
        Ok(true)
    }

    async fn mark_status(
        &self,
        composite_id: &WebhookCompositeId,
        status: WebhookProcessingStatus,
    ) -> anyhow::Result<()> {
        if let Some(record) = self.entries.lock().await.get_mut(&composite_id.key()) {
            record.processing_status = status;
        }
        Ok(())
    }

    async fn get(&self, composite_id: &WebhookCompositeId) -> anyhow::Result<Option<WebhookRecord>> {
        Ok(self.entries.lock().await.get(&composite_id.key()).cloned())
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<usize> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, record| record.received_at >= cutoff);
        Ok(before - entries.len())
    }
}
