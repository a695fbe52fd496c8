use std::path::Path;

use anyhow::anyhow;
use tokio::fs;
use tracing::warn;

use backend_domain::EventCatalog;

/// Reads the YAML event catalog. A missing file yields an empty catalog.
pub async fn load_event_catalog(path: &str) -> anyhow::Result<EventCatalog> {
    if !Path::new(path).exists() {
        warn!(path, "event catalog not found, starting with no events");
        return Ok(EventCatalog::default());
    }
    let content = fs::read_to_string(path).await?;
    parse_event_catalog(&content).map_err(|err| anyhow!("invalid event catalog {}: {}", path, err))
}

pub fn parse_event_catalog(content: &str) -> anyhow::Result<EventCatalog> {
    let mut catalog: EventCatalog = serde_yaml::from_str(content)?;
    for event in &mut catalog.events {
        event.event_id = event.event_id.trim().to_string();
        event.organizer_id = event.organizer_id.trim().to_string();
        if event.event_id.is_empty() {
            return Err(anyhow!("event entry without event_id"));
        }
    }
    for grant in &mut catalog.staff {
        grant.event_id = grant.event_id.trim().to_string();
        grant.user_id = grant.user_id.trim().to_string();
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
events:
  - event_id: " E1 "
    name: Spring Gala
    organizer_id: org-1
    starts_at: 2030-05-01T18:00:00Z
    ticket_prefix: gal
staff:
  - event_id: E1
    user_id: staff-1
    role: door
    can_scan: true
"#;

    #[test]
    fn parses_events_and_staff() {
        let catalog = parse_event_catalog(CATALOG).expect("parse");
        assert_eq!(catalog.events.len(), 1);
        assert_eq!(catalog.events[0].event_id, "E1");
        assert_eq!(catalog.events[0].number_prefix(), "GAL");
        assert!(catalog.staff[0].can_scan);
    }

    #[test]
    fn rejects_event_without_id() {
        let raw = "events:\n  - event_id: \"\"\n    name: x\n    organizer_id: o\n";
        assert!(parse_event_catalog(raw).is_err());
    }

    #[tokio::test]
    async fn loads_catalog_from_disk() {
        let dir = std::env::temp_dir().join(format!("ticketgate-catalog-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.expect("mkdir");
        let path = dir.join("events.yaml").to_string_lossy().to_string();
        tokio::fs::write(&path, CATALOG).await.expect("write");
        let loaded = load_event_catalog(&path).await.expect("load");
        assert_eq!(loaded.events[0].name, "Spring Gala");
        assert_eq!(loaded.staff[0].user_id, "staff-1");
        let _ = tokio::fs::remove_dir_all(&dir).await;

        let broken = dir.with_extension("broken.yaml");
        tokio::fs::write(&broken, "events: [").await.expect("write");
        let err = load_event_catalog(&broken.to_string_lossy())
            .await
            .expect_err("malformed yaml");
        assert!(err.to_string().contains("invalid event catalog"));
        let _ = tokio::fs::remove_file(&broken).await;
    }

    #[tokio::test]
    async fn missing_file_is_empty_catalog() {
        let catalog = load_event_catalog("/nonexistent/ticketgate/events.yaml")
            .await
            .expect("load");
        assert!(catalog.events.is_empty());
    }
}
