use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Request ids currently being worked on, evicted after a TTL so a crashed
/// handler cannot block its key forever.
pub struct InFlightRegistry {
    ttl: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl InFlightRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Claims `key`; false when another live request holds it.
    pub async fn try_begin(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if let Some(started) = entries.get(key) {
            if now.duration_since(*started) < self.ttl {
                return false;
            }
        }
        entries.insert(key.to_string(), now);
        true
    }

    pub async fn finish(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, started| now.duration_since(*started) < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
