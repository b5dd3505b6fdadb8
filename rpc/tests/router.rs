//! End-to-end routing tests: JSON in, JSON out, no sockets.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use proofpass_nullables::{NullClock, NullStore};
use proofpass_registry::{RegistryConfig, RegistryMetrics, VerificationRegistry};
use proofpass_rpc::{router, RpcState};
use proofpass_types::Address;

const OWNER: &str = "0xa0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0";
const ISSUER: &str = "0x1111111111111111111111111111111111111111";
const REQUESTER: &str = "0x2222222222222222222222222222222222222222";
const HOLDER: &str = "0x3333333333333333333333333333333333333333";

fn app_with_config(config: RegistryConfig, metrics: Option<Arc<RegistryMetrics>>) -> Router {
    let mut registry = VerificationRegistry::new(
        Arc::new(NullStore::new()),
        Arc::new(NullClock::new(1_700_000_000)),
        config,
    )
    .unwrap();
    if let Some(metrics) = &metrics {
        registry = registry.with_metrics(metrics.clone());
    }
    let state = RpcState {
        registry: Arc::new(registry),
        metrics,
    };
    router(state, &["http://localhost:3000".to_string()])
}

fn app_with(metrics: Option<Arc<RegistryMetrics>>) -> Router {
    app_with_config(RegistryConfig::new(Address::parse(OWNER).unwrap()), metrics)
}

fn app() -> Router {
    app_with(None)
}

async fn call(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Authorize ISSUER and mint certificate #1 to HOLDER.
async fn seed(app: &Router) {
    let (status, _) = call(
        app,
        json!({ "action": "authorize_issuer", "caller": OWNER, "address": ISSUER }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(
        app,
        json!({
            "action": "issue_certificate",
            "caller": ISSUER,
            "recipient": HOLDER,
            "metadata_uri": "ipfs://bafy-degree",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["certificate_id"], 1);
}

// ── Health and metrics ──────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn metrics_disabled_is_not_found() {
    let (status, _) = get(&app(), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_count_mutations() {
    let metrics = Arc::new(RegistryMetrics::new().unwrap());
    let app = app_with(Some(metrics));
    seed(&app).await;
    let (status, text) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains(r#"proofpass_mutations_accepted_total{action="issue_certificate"} 1"#));
}

// ── Verification flow ───────────────────────────────────────────────────

#[tokio::test]
async fn verification_flow_over_rpc() {
    let app = app();
    seed(&app).await;

    let (status, body) = call(
        &app,
        json!({
            "action": "submit_verification_request",
            "caller": REQUESTER,
            "certificate_id": 1,
            "reason": "employment check",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request_id"], 1);

    let (status, body) = call(
        &app,
        json!({
            "action": "submit_verification_request",
            "caller": REQUESTER,
            "certificate_id": 1,
            "reason": "employment check",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_pending_request");

    let (status, body) = call(
        &app,
        json!({
            "action": "reject_verification_request",
            "caller": HOLDER,
            "certificate_id": 1,
            "requester": REQUESTER,
            "reason": "insufficient proof",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = call(
        &app,
        json!({
            "action": "reject_verification_request",
            "caller": ISSUER,
            "certificate_id": 1,
            "requester": REQUESTER,
            "reason": "insufficient proof",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "rejected");
    assert_eq!(body["request"]["rejection_reason"], "insufficient proof");

    let (status, body) = call(
        &app,
        json!({
            "action": "approve_verification_request",
            "caller": ISSUER,
            "certificate_id": 1,
            "requester": REQUESTER,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_resolved");

    let (_, body) = call(
        &app,
        json!({ "action": "certificate_verification_requests", "certificate_id": 1 }),
    )
    .await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_certificate_is_404() {
    let app = app();
    let (status, body) = call(
        &app,
        json!({
            "action": "submit_verification_request",
            "caller": REQUESTER,
            "certificate_id": 9,
            "reason": "check",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = call(&app, json!({ "action": "certificate", "certificate_id": 9 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Issuer flow ─────────────────────────────────────────────────────────

#[tokio::test]
async fn issuer_request_flow_over_rpc() {
    let app = app();
    let (status, _) = call(
        &app,
        json!({ "action": "submit_issuer_request", "caller": REQUESTER, "reason": "want to issue degrees" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, json!({ "action": "pending_requesters" })).await;
    assert_eq!(body["requesters"], json!([REQUESTER]));

    let (status, _) = call(
        &app,
        json!({ "action": "approve_issuer_request", "caller": OWNER, "requester": REQUESTER }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(
        &app,
        json!({ "action": "is_authorized_issuer", "address": REQUESTER }),
    )
    .await;
    assert_eq!(body["authorized"], true);

    let (_, body) = call(&app, json!({ "action": "issuers" })).await;
    assert_eq!(body["issuers"], json!([{ "address": REQUESTER, "authorized": true }]));

    let (_, body) = call(&app, json!({ "action": "issuer_request", "address": HOLDER })).await;
    assert_eq!(body["request"], Value::Null);
}

// ── Activity log ────────────────────────────────────────────────────────

#[tokio::test]
async fn activity_logs_paginate() {
    let app = app();
    seed(&app).await;

    let (_, body) = call(&app, json!({ "action": "activity_logs", "offset": 0, "limit": 1 })).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["next_offset"], 1);
    assert_eq!(body["entries"][0]["label"], "ISSUER_AUTHORIZE");
    assert_eq!(body["entries"][0]["actor"], OWNER);

    let (_, body) = call(&app, json!({ "action": "activity_logs", "offset": 1 })).await;
    assert_eq!(body["entries"][0]["label"], "CERTIFICATE_ISSUE");
    assert!(body.get("next_offset").is_none());

    let (status, body) = call(&app, json!({ "action": "activity_logs", "offset": 50 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], json!([]));

    let (_, body) = call(
        &app,
        json!({ "action": "activity_logs", "address": HOLDER }),
    )
    .await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert!(body.get("total").is_none());
}

#[tokio::test]
async fn pages_follow_configured_maximum() {
    let mut config = RegistryConfig::new(Address::parse(OWNER).unwrap());
    config.max_page_size = 50;
    let app = app_with_config(config, None);
    for n in 1..=120u32 {
        let address = format!("0x{n:040x}");
        let (status, _) = call(
            &app,
            json!({ "action": "authorize_issuer", "caller": OWNER, "address": address }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Default limit of 100 is cut to 50; the next page is still advertised.
    let (_, body) = call(&app, json!({ "action": "activity_logs" })).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 50);
    assert_eq!(body["total"], 120);
    assert_eq!(body["next_offset"], 50);

    let (_, body) = call(&app, json!({ "action": "activity_logs", "offset": 50, "limit": 500 })).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 50);
    assert_eq!(body["next_offset"], 100);

    let (_, body) = call(&app, json!({ "action": "activity_logs", "offset": 100 })).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 20);
    assert!(body.get("next_offset").is_none());

    let (_, body) = call(&app, json!({ "action": "activity_logs", "address": OWNER })).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 50);
    assert_eq!(body["next_offset"], 50);
}

// ── Employers and endorsements ──────────────────────────────────────────

#[tokio::test]
async fn employer_registration_and_verification() {
    let app = app();
    let (_, body) = call(&app, json!({ "action": "is_employer", "address": ISSUER })).await;
    assert_eq!(body["employer"], false);
    let (_, body) = call(&app, json!({ "action": "employer", "address": ISSUER })).await;
    assert_eq!(body["employer"], Value::Null);

    let (status, body) = call(
        &app,
        json!({
            "action": "register_employer",
            "caller": ISSUER,
            "name": "Acme Labs",
            "description": "hiring",
            "website": "https://acme.example",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employer"]["verified"], false);

    let (status, body) = call(
        &app,
        json!({ "action": "verify_employer", "caller": REQUESTER, "address": ISSUER }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = call(
        &app,
        json!({ "action": "verify_employer", "caller": OWNER, "address": ISSUER }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employer"]["verified"], true);

    let (status, body) = call(
        &app,
        json!({ "action": "verify_employer", "caller": OWNER, "address": ISSUER }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_resolved");

    let (_, body) = call(&app, json!({ "action": "employers" })).await;
    assert_eq!(body["employers"][0]["name"], "Acme Labs");
}

// ── Malformed input ─────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_body_is_invalid_input() {
    let app = app();
    let (status, body) = call(&app, json!({ "action": "no_such_action" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, body) = call(
        &app,
        json!({ "action": "authorize_issuer", "caller": OWNER, "address": "not-an-address" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn owner_and_supply_queries() {
    let app = app();
    seed(&app).await;
    let (_, body) = call(&app, json!({ "action": "owner" })).await;
    assert_eq!(body["owner"], OWNER);
    let (_, body) = call(&app, json!({ "action": "total_supply" })).await;
    assert_eq!(body["total_supply"], 1);
    let (_, body) = call(&app, json!({ "action": "certificates_of", "owner": HOLDER })).await;
    assert_eq!(body["certificates"][0]["metadata_uri"], "ipfs://bafy-degree");

    let endorse = json!({ "action": "add_endorsement", "caller": ISSUER, "user": HOLDER, "skill": "rust" });
    let (status, body) = call(&app, endorse.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = call(
        &app,
        json!({
            "action": "register_employer",
            "caller": ISSUER,
            "name": "Acme Labs",
            "description": "hiring",
            "website": "https://acme.example",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, endorse).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, json!({ "action": "user_endorsements", "user": HOLDER })).await;
    assert_eq!(body["endorsements"][0]["skill"], "rust");
}
