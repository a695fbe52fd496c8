// Runtime configuration consumed by the application layer

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    /// Empty by default; startup validation rejects it until configured.
    pub qr_secret: String,
    pub qr_token_prefix: String,
    pub webhook_secret: String,
    pub ticket_validity_days: i64,
    /// Codec-level staleness ceiling; 0 disables it.
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

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            qr_secret: String::new(),
            qr_token_prefix: "TKT1:".to_string(),
            webhook_secret: String::new(),
            ticket_validity_days: 365,
            max_token_age_days: 0,
            early_checkin_hours: 2,
            bulk_max_quantity: 5000,
            bulk_default_batch_size: 50,
            bulk_batch_delay_ms: 100,
            render_budget_seconds: 25,
            webhook_retention_hours: 24 * 30,
            inflight_ttl_seconds: 300,
            maintenance_interval_seconds: 60,
            event_catalog_path: "./events.yaml".to_string(),
            ticket_template_path: None,
            max_body_bytes: 2 * 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
