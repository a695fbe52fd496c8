use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{ops_handlers, scan_handlers, ticket_handlers, webhook_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/tickets", post(ticket_handlers::issue_ticket))
        .route("/v1/tickets/bulk", post(ticket_handlers::issue_bulk))
        .route(
            "/v1/tickets/bulk/render",
            post(ticket_handlers::render_bulk),
        )
        .route("/v1/tickets/:ticket_number", get(ticket_handlers::get_ticket))
        .route(
            "/v1/tickets/:ticket_number/scans",
            get(ticket_handlers::list_ticket_scans),
        )
        .route(
            "/v1/tickets/:ticket_number/cancel",
            post(ticket_handlers::cancel_ticket),
        )
        .route("/v1/scan", post(scan_handlers::scan_ticket))
        .route(
            "/v1/webhooks/payment",
            post(webhook_handlers::payment_webhook),
        )
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
