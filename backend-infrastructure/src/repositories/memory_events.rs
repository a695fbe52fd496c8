use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use backend_domain::ports::EventDirectory;
use backend_domain::{EventCatalog, EventInfo, StaffPermission};

#[derive(Default)]
struct Directory {
    events: HashMap<String, EventInfo>,
    /// (event id, user id) -> grant
    staff: HashMap<(String, String), StaffPermission>,
}

impl From<EventCatalog> for Directory {
    fn from(catalog: EventCatalog) -> Self {
        let events = catalog
            .events
            .into_iter()
            .map(|event| (event.event_id.clone(), event))
            .collect();
        let staff = catalog
            .staff
            .into_iter()
            .map(|grant| ((grant.event_id.clone(), grant.user_id.clone()), grant))
            .collect();
        Self { events, staff }
    }
}

/// Event directory backed by the catalog file contents.
#[derive(Default)]
pub struct InMemoryEventDirectory {
    directory: RwLock<Directory>,
}

impl InMemoryEventDirectory {
    pub fn from_catalog(catalog: EventCatalog) -> Self {
        Self {
            directory: RwLock::new(Directory::from(catalog)),
        }
    }

    pub async fn replace(&self, catalog: EventCatalog) {
        *self.directory.write().await = Directory::from(catalog);
    }
}

#[async_trait]
impl EventDirectory for InMemoryEventDirectory {
    async fn get_event(&self, event_id: &str) -> anyhow::Result<Option<EventInfo>> {
        Ok(self.directory.read().await.events.get(event_id.trim()).cloned())
    }

    async fn staff_permission(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> anyhow::Result<Option<StaffPermission>> {
        let key = (event_id.trim().to_string(), user_id.trim().to_string());
        Ok(self.directory.read().await.staff.get(&key).cloned())
    }
}
