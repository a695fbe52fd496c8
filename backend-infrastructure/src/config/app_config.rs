use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use super::validation::{validate_positive, validate_range, validate_secret};
use backend_domain::RuntimeConfig;

pub const CONFIG_PATH_ENV: &str = "TICKETGATE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.toml";
pub const MAX_TICKET_VALIDITY_DAYS: i64 = 36_500;
pub const MAX_EARLY_CHECKIN_HOURS: i64 = 8_760;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub qr_secret: String,
    pub qr_token_prefix: String,
    pub webhook_secret: String,
    pub ticket_validity_days: i64,
    pub max_token_age_days: u64,
    pub early_checkin_hours: i64,
    pub bulk_max_quantity: u32,
    pub bulk_default_batch_size: usize,
    pub bulk_batch_delay_ms: u64,
    pub render_budget_seconds: u64,
    pub webhook_retention_hours: u64,
    pub inflight_ttl_seconds: u64,
    pub maintenance_interval_seconds: u64,
    pub event_catalog_path: String,
    pub ticket_template_path: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            api_token: runtime.api_token,
            qr_secret: runtime.qr_secret,
            qr_token_prefix: runtime.qr_token_prefix,
            webhook_secret: runtime.webhook_secret,
            ticket_validity_days: runtime.ticket_validity_days,
            max_token_age_days: runtime.max_token_age_days,
            early_checkin_hours: runtime.early_checkin_hours,
            bulk_max_quantity: runtime.bulk_max_quantity,
            bulk_default_batch_size: runtime.bulk_default_batch_size,
            bulk_batch_delay_ms: runtime.bulk_batch_delay_ms,
            render_budget_seconds: runtime.render_budget_seconds,
            webhook_retention_hours: runtime.webhook_retention_hours,
            inflight_ttl_seconds: runtime.inflight_ttl_seconds,
            maintenance_interval_seconds: runtime.maintenance_interval_seconds,
            event_catalog_path: runtime.event_catalog_path,
            ticket_template_path: runtime.ticket_template_path,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", path, err))?
        } else {
            warn!(path, "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(api_token) = &self.api_token {
            if api_token.trim().is_empty() {
                self.api_token = None;
            }
        }
        if let Some(template) = &self.ticket_template_path {
            if template.trim().is_empty() {
                self.ticket_template_path = None;
            }
        }
        self.qr_token_prefix = self.qr_token_prefix.trim().to_string();
        if self.bulk_default_batch_size == 0 {
            self.bulk_default_batch_size = 1;
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.event_catalog_path = resolve_path(base, &self.event_catalog_path);
        if let Some(template) = &self.ticket_template_path {
            self.ticket_template_path = Some(resolve_path(base, template));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        validate_secret("qr_secret", &self.qr_secret)?;
        validate_secret("webhook_secret", &self.webhook_secret)?;
        validate_range(
            "ticket_validity_days",
            self.ticket_validity_days,
            1,
            MAX_TICKET_VALIDITY_DAYS,
        )?;
        validate_range(
            "early_checkin_hours",
            self.early_checkin_hours,
            0,
            MAX_EARLY_CHECKIN_HOURS,
        )?;
        validate_positive("bulk_max_quantity", u64::from(self.bulk_max_quantity))?;
        validate_positive("render_budget_seconds", self.render_budget_seconds)?;
        validate_positive("inflight_ttl_seconds", self.inflight_ttl_seconds)?;
        validate_positive("maintenance_interval_seconds", self.maintenance_interval_seconds)?;
        validate_positive("max_body_bytes", self.max_body_bytes)?;
        validate_positive("request_timeout_seconds", self.request_timeout_seconds)?;
        if self.event_catalog_path.trim().is_empty() {
            return Err(anyhow!("event_catalog_path must not be empty"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            qr_secret: self.qr_secret.clone(),
            qr_token_prefix: self.qr_token_prefix.clone(),
            webhook_secret: self.webhook_secret.clone(),
            ticket_validity_days: self.ticket_validity_days,
            max_token_age_days: self.max_token_age_days,
            early_checkin_hours: self.early_checkin_hours,
            bulk_max_quantity: self.bulk_max_quantity,
            bulk_default_batch_size: self.bulk_default_batch_size,
            bulk_batch_delay_ms: self.bulk_batch_delay_ms,
            render_budget_seconds: self.render_budget_seconds,
            webhook_retention_hours: self.webhook_retention_hours,
            inflight_ttl_seconds: self.inflight_ttl_seconds,
            maintenance_interval_seconds: self.maintenance_interval_seconds,
            event_catalog_path: self.event_catalog_path.clone(),
            ticket_template_path: self.ticket_template_path.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("TICKETGATE_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("TICKETGATE_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("TICKETGATE_QR_SECRET") {
            self.qr_secret = value;
        }
        if let Ok(value) = env::var("TICKETGATE_QR_TOKEN_PREFIX") {
            self.qr_token_prefix = value;
        }
        if let Ok(value) = env::var("TICKETGATE_WEBHOOK_SECRET") {
            self.webhook_secret = value;
        }
        if let Ok(value) = env::var("TICKETGATE_TICKET_VALIDITY_DAYS") {
            self.ticket_validity_days = value.parse().unwrap_or(self.ticket_validity_days);
        }
        if let Ok(value) = env::var("TICKETGATE_MAX_TOKEN_AGE_DAYS") {
            self.max_token_age_days = value.parse().unwrap_or(self.max_token_age_days);
        }
        if let Ok(value) = env::var("TICKETGATE_EARLY_CHECKIN_HOURS") {
            self.early_checkin_hours = value.parse().unwrap_or(self.early_checkin_hours);
        }
        if let Ok(value) = env::var("TICKETGATE_BULK_MAX_QUANTITY") {
            self.bulk_max_quantity = value.parse().unwrap_or(self.bulk_max_quantity);
        }
        if let Ok(value) = env::var("TICKETGATE_BULK_DEFAULT_BATCH_SIZE") {
            self.bulk_default_batch_size = value.parse().unwrap_or(self.bulk_default_batch_size);
        }
        if let Ok(value) = env::var("TICKETGATE_BULK_BATCH_DELAY_MS") {
            self.bulk_batch_delay_ms = value.parse().unwrap_or(self.bulk_batch_delay_ms);
        }
        if let Ok(value) = env::var("TICKETGATE_RENDER_BUDGET_SECONDS") {
            self.render_budget_seconds = value.parse().unwrap_or(self.render_budget_seconds);
        }
        if let Ok(value) = env::var("TICKETGATE_WEBHOOK_RETENTION_HOURS") {
            self.webhook_retention_hours = value.parse().unwrap_or(self.webhook_retention_hours);
        }
        if let Ok(value) = env::var("TICKETGATE_INFLIGHT_TTL_SECONDS") {
            self.inflight_ttl_seconds = value.parse().unwrap_or(self.inflight_ttl_seconds);
        }
        if let Ok(value) = env::var("TICKETGATE_MAINTENANCE_INTERVAL_SECONDS") {
            self.maintenance_interval_seconds =
                value.parse().unwrap_or(self.maintenance_interval_seconds);
        }
        if let Ok(value) = env::var("TICKETGATE_EVENT_CATALOG_PATH") {
            self.event_catalog_path = value;
        }
        if let Ok(value) = env::var("TICKETGATE_TICKET_TEMPLATE_PATH") {
            self.ticket_template_path = Some(value);
        }
        if let Ok(value) = env::var("TICKETGATE_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("TICKETGATE_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
