use std::io::Read;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use flate2::read::GzDecoder;
use serde_json::{json, Value};
use tower::ServiceExt;

use backend_application::commands::webhook_commands;
use backend_application::AppState;
use backend_domain::{EventCatalog, EventInfo, PaymentNotification, RuntimeConfig, StaffPermission};
use backend_infrastructure::build_in_memory_state;
use backend_interfaces_http::build_router;

const API_TOKEN: &str = "ops-token";

fn state() -> AppState {
    let config = RuntimeConfig {
        api_token: Some(API_TOKEN.to_string()),
        qr_secret: "router-qr-secret-0123456789".to_string(),
        webhook_secret: "router-webhook-secret-0123".to_string(),
        bulk_batch_delay_ms: 1,
        ..RuntimeConfig::default()
    };
    let catalog = EventCatalog {
        events: vec![EventInfo {
            event_id: "E1".to_string(),
            name: "Spring Gala".to_string(),
            organizer_id: "org-1".to_string(),
            starts_at: Some(Utc::now() - Duration::hours(1)),
            ticket_prefix: Some("GAL".to_string()),
        }],
        staff: vec![StaffPermission {
            event_id: "E1".to_string(),
            user_id: "staff-1".to_string(),
            role: None,
            can_scan: true,
        }],
    };
    build_in_memory_state(config, catalog).expect("state")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", API_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, bytes.to_vec())
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json body")
}

async fn issue(router: &Router) -> Value {
    let body = json!({
        "owner_id": "user-1",
        "event_id": "E1",
        "booking_id": "B1",
        "ticket_type": "vip",
        "event_date": Utc::now().to_rfc3339(),
    });
    let (status, bytes) = send(router, post_json("/v1/tickets", &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json_of(&bytes)
}

#[tokio::test]
async fn rejects_requests_without_bearer_token() {
    let router = build_router(state());
    let request = Request::builder()
        .uri("/v1/tickets/GAL-1-ABCD")
        .body(Body::empty())
        .expect("request");
    let (status, bytes) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(&bytes)["error"], "unauthorized");
}

#[tokio::test]
async fn scan_endpoint_checks_in_once() {
    let router = build_router(state());
    let ticket = issue(&router).await;
    let token = ticket["qr_token"].as_str().expect("token").to_string();

    let mut scan = post_json("/v1/scan", &json!({ "token": token }));
    scan.headers_mut()
        .insert("x-actor-id", "staff-1".parse().expect("header"));
    let (status, bytes) = send(&router, scan).await;
    assert_eq!(status, StatusCode::OK);
    let first = json_of(&bytes);
    assert_eq!(first["success"], true);
    assert_eq!(first["result"], "success");

    let (status, bytes) = send(
        &router,
        post_json("/v1/scan", &json!({ "token": token, "scanned_by": "staff-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second = json_of(&bytes);
    assert_eq!(second["success"], false);
    assert_eq!(second["result"], "already_used");

    let number = ticket["identity"]["ticket_number"].as_str().expect("number");
    let request = Request::builder()
        .uri(format!("/v1/tickets/{}/scans?limit=10", number))
        .header(header::AUTHORIZATION, format!("Bearer {}", API_TOKEN))
        .body(Body::empty())
        .expect("request");
    let (status, bytes) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&bytes).as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn unknown_ticket_is_not_found() {
    let router = build_router(state());
    let request = Request::builder()
        .uri("/v1/tickets/GAL-0-0000")
        .header(header::AUTHORIZATION, format!("Bearer {}", API_TOKEN))
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_redelivery_is_conflict() {
    let state = state();
    let router = build_router(state.clone());
    let mut body = json!({
        "webhook_id": "wh-1",
        "event_type": "PAYMENT.SUCCESS",
        "order_id": "O1",
        "status": "success",
        "amount": 1500,
        "signature": "",
    });
    let notification: PaymentNotification =
        serde_json::from_value(body.clone()).expect("notification");
    body["signature"] = Value::String(webhook_commands::expected_signature(
        &state.config.webhook_secret,
        &notification,
    ));

    let request = |body: &Value| {
        Request::builder()
            .method("POST")
            .uri("/v1/webhooks/payment")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    };
    let (status, bytes) = send(&router, request(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&bytes)["order_id"], "O1");

    let (status, bytes) = send(&router, request(&body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let rejection = json_of(&bytes);
    assert_eq!(rejection["reason"], "duplicate");
    assert_eq!(rejection["error"], "webhook already processed");

    body["signature"] = Value::String("00".repeat(32));
    body["webhook_id"] = Value::String("wh-2".to_string());
    let (status, bytes) = send(&router, request(&body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(&bytes)["error"], "webhook signature mismatch");
}

#[tokio::test]
async fn bulk_render_streams_gzip_archive() {
    let router = build_router(state());
    let body = json!({
        "event_id": "E1",
        "owner_id": "org-1",
        "ticket_type": "general",
        "event_date": Utc::now().to_rfc3339(),
        "quantity": 4,
    });
    let response = router
        .clone()
        .oneshot(post_json("/v1/tickets/bulk/render", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers["content-type"], "application/gzip");
    assert_eq!(headers["x-tickets-generated"], "4");
    assert_eq!(headers["x-persistence-errors"], "0");
    assert!(headers["content-disposition"]
        .to_str()
        .expect("disposition")
        .contains("tickets-E1.json.gz"));

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let mut text = String::new();
    GzDecoder::new(&bytes[..])
        .read_to_string(&mut text)
        .expect("gunzip");
    let bundle: Value = serde_json::from_str(&text).expect("bundle");
    assert_eq!(bundle["entries"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn ops_endpoints_report_health_and_metrics() {
    let router = build_router(state());
    let live = Request::builder()
        .uri("/v1/ops/health/live")
        .body(Body::empty())
        .expect("request");
    assert_eq!(send(&router, live).await.0, StatusCode::OK);

    let ready = Request::builder()
        .uri("/v1/ops/health/ready")
        .body(Body::empty())
        .expect("request");
    assert_eq!(send(&router, ready).await.0, StatusCode::OK);

    issue(&router).await;
    let metrics = Request::builder()
        .uri("/v1/ops/metrics/prometheus")
        .header(header::AUTHORIZATION, format!("Bearer {}", API_TOKEN))
        .body(Body::empty())
        .expect("request");
    let (status, bytes) = send(&router, metrics).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).expect("utf8");
    assert!(text.contains("ticketgate_tickets_issued_total 1"));
}
