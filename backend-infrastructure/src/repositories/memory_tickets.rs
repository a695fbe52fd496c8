use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use backend_domain::ports::TicketRepository;
use backend_domain::{TicketChange, TicketId, TicketNumber, TicketRecord, TicketStatus};

#[derive(Default)]
struct TicketTables {
    by_id: HashMap<String, TicketRecord>,
    /// ticket number -> ticket id
    by_number: HashMap<String, String>,
}

/// Ticket store with a dual index. Status transitions are compare-and-set
/// under the write lock.
#[derive(Default)]
pub struct InMemoryTicketRepository {
    tables: RwLock<TicketTables>,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.by_id.len()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn insert(&self, record: TicketRecord) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let id = record.ticket_id().as_str().to_string();
        let number = record.ticket_number().as_str().to_string();
        if tables.by_id.contains_key(&id) || tables.by_number.contains_key(&number) {
            return Ok(false);
        }
        tables.by_number.insert(number, id.clone());
        tables.by_id.insert(id, record);
        Ok(true)
    }

    async fn get_by_number(&self, number: &TicketNumber) -> anyhow::Result<Option<TicketRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_number
            .get(number.as_str())
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn get_by_id(&self, ticket_id: &TicketId) -> anyhow::Result<Option<TicketRecord>> {
        Ok(self.tables.read().await.by_id.get(ticket_id.as_str()).cloned())
    }

    async fn list_by_booking(&self, booking_id: &str) -> anyhow::Result<Vec<TicketRecord>> {
        let tables = self.tables.read().await;
        let mut tickets: Vec<TicketRecord> = tables
            .by_id
            .values()
            .filter(|record| record.identity.booking_id == booking_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|record| record.issued_at);
        Ok(tickets)
    }

    async fn conditional_transition(
        &self,
        ticket_id: &TicketId,
        expected: TicketStatus,
        change: TicketChange,
    ) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.by_id.get_mut(ticket_id.as_str()) else {
            return Ok(false);
        };
        if record.status != expected || !record.status.can_transition_to(change.status) {
            return Ok(false);
        }
        record.apply(&change);
        Ok(true)
    }

    async fn record_scan_attempt(
        &self,
        ticket_id: &TicketId,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(record) = tables.by_id.get_mut(ticket_id.as_str()) {
            record.stamp_scan(at);
        }
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use backend_domain::TicketIdentity;

    fn record(id: &str, number: &str, booking: &str) -> TicketRecord {
        let now = Utc::now();
        TicketRecord::new(
            TicketIdentity {
                ticket_id: TicketId(id.to_string()),
                event_id: "E1".to_string(),
                booking_id: booking.to_string(),
                owner_id: "U1".to_string(),
                ticket_number: TicketNumber(number.to_string()),
                ticket_type: "general".to_string(),
                event_date: now,
                valid_until: now + Duration::days(1),
            },
            "token".to_string(),
            None,
            now,
        )
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id_or_number() {
        let repo = InMemoryTicketRepository::new();
        assert!(repo.insert(record("t1", "N-1", "B1")).await.expect("insert"));
        assert!(!repo.insert(record("t1", "N-2", "B1")).await.expect("dup id"));
        assert!(!repo.insert(record("t2", "N-1", "B1")).await.expect("dup number"));
        assert_eq!(repo.len().await, 1);
        let found = repo
            .get_by_number(&TicketNumber("N-1".to_string()))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.ticket_id().as_str(), "t1");
    }

    #[tokio::test]
    async fn transition_requires_expected_status() {
        let repo = InMemoryTicketRepository::new();
        repo.insert(record("t1", "N-1", "B1")).await.expect("insert");
        let id = TicketId("t1".to_string());
        let now = Utc::now();
        assert!(repo
            .conditional_transition(&id, TicketStatus::Valid, TicketChange::check_in("s", now))
            .await
            .expect("first"));
        assert!(!repo
            .conditional_transition(&id, TicketStatus::Valid, TicketChange::check_in("s", now))
            .await
            .expect("second"));
        assert!(!repo
            .conditional_transition(&id, TicketStatus::Used, TicketChange::cancel())
            .await
            .expect("used is terminal"));
        let stored = repo.get_by_id(&id).await.expect("get").expect("present");
        assert_eq!(stored.status, TicketStatus::Used);
        assert_eq!(stored.scan_count, 1);
        assert_eq!(stored.checked_in_by.as_deref(), Some("s"));
    }

    #[tokio::test]
    async fn concurrent_transitions_commit_once() {
        let repo = Arc::new(InMemoryTicketRepository::new());
        repo.insert(record("t1", "N-1", "B1")).await.expect("insert");
        let mut handles = Vec::new();
        for n in 0..32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.conditional_transition(
                    &TicketId("t1".to_string()),
                    TicketStatus::Valid,
                    TicketChange::check_in(&format!("staff-{}", n), Utc::now()),
                )
                .await
                .expect("transition")
            }));
        }
        let mut wins = 0;
        for handle in handles {
            if handle.await.expect("join") {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn list_by_booking_filters() {
        let repo = InMemoryTicketRepository::new();
        repo.insert(record("t1", "N-1", "B1")).await.expect("insert");
        repo.insert(record("t2", "N-2", "B2")).await.expect("insert");
        repo.insert(record("t3", "N-3", "B1")).await.expect("insert");
        let tickets = repo.list_by_booking("B1").await.expect("list");
        assert_eq!(tickets.len(), 2);
    }
}
