// Event catalog entities
// Events and staff grants are owned by the surrounding CRUD application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const FALLBACK_PREFIX: &str = "TKT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInfo {
    pub event_id: String,
    pub name: String,
    pub organizer_id: String,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ticket_prefix: Option<String>,
}

impl EventInfo {
    /// Ticket number prefix: the configured one, else the first three
    /// alphanumerics of the event name.
    pub fn number_prefix(&self) -> String {
        if let Some(prefix) = self
            .ticket_prefix
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            return prefix.to_uppercase();
        }
        let derived: String = self
            .name
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .take(3)
            .collect::<String>()
            .to_uppercase();
        if derived.is_empty() {
            FALLBACK_PREFIX.to_string()
        } else {
            derived
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffPermission {
    pub event_id: String,
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub can_scan: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCatalog {
    #[serde(default)]
    pub events: Vec<EventInfo>,
    #[serde(default)]
    pub staff: Vec<StaffPermission>,
}
