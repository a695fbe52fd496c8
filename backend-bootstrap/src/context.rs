use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use backend_application::AppState;
use backend_infrastructure::{
    build_state_with_renderer, load_event_catalog, AppConfig, SvgTicketRenderer,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let catalog = load_event_catalog(&runtime_config.event_catalog_path).await?;
        info!(
            events = catalog.events.len(),
            staff = catalog.staff.len(),
            "event catalog loaded"
        );

        let renderer =
            SvgTicketRenderer::load(runtime_config.ticket_template_path.as_deref()).await?;
        let state = build_state_with_renderer(runtime_config, catalog, Arc::new(renderer))?;

        Ok(Self { state })
    }
}
