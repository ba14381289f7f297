// ---------------------------------------------------------------------------
// Integration tests for the assessment API
// ---------------------------------------------------------------------------
//
// Everything here exercises the router without touching the network: invalid
// targets are rejected by the validator before any probe is issued, and the
// admission controller fires before the pipeline runs at all.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use aegis_rs_assessor::api::AppState;
use aegis_rs_assessor::config::AppConfig;

fn test_app() -> axum::Router {
    aegis_rs_assessor::api::build_router(Arc::new(AppState::new(AppConfig::offline())))
}

fn assess_request(url: &str, client: &str) -> Request<Body> {
    Request::post("/api/assess")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(format!(r#"{{"url":{}}}"#, serde_json::json!(url))))
        .unwrap()
}

async fn parse_json(body: Body) -> serde_json::Value {
    let bytes = axum::body::to_bytes(body, 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = test_app();

    let req = Request::get("/api/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = parse_json(resp.into_body()).await;
    assert_eq!(json["status"], "ok");
}

// ---------------------------------------------------------------------------
// Invalid targets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_private_targets_are_rejected_with_400() {
    let app = test_app();

    for (i, target) in [
        "10.0.0.1",
        "192.168.1.1",
        "172.16.0.1",
        "127.0.0.1",
        "localhost",
        "app.localhost",
        "test.local",
    ]
    .iter()
    .enumerate()
    {
        // A fresh client key per request keeps the admission gate out of
        // the way.
        let client = format!("203.0.113.{}", i + 1);
        let resp = app
            .clone()
            .oneshot(assess_request(target, &client))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "target {:?}", target);

        let json = parse_json(resp.into_body()).await;
        assert_eq!(json["error"], "invalid_target");
        assert_eq!(json["original_input"], *target);
    }
}

#[tokio::test]
async fn test_malformed_targets_are_rejected_with_400() {
    let app = test_app();

    for (i, target) in ["", "not-a-url", "ftp://x.com"].iter().enumerate() {
        let client = format!("198.51.100.{}", i + 1);
        let resp = app
            .clone()
            .oneshot(assess_request(target, &client))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "target {:?}", target);

        let json = parse_json(resp.into_body()).await;
        assert_eq!(json["original_input"], *target);
    }
}

#[tokio::test]
async fn test_body_without_url_field_is_a_client_error() {
    let app = test_app();

    let req = Request::post("/api/assess")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"target":"example.com"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
}

// ---------------------------------------------------------------------------
// Admission control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_quota_exhaustion_returns_429() {
    let app = test_app();

    // Default quota is 3 per window; the 4th request from the same client
    // must be refused. Invalid targets still consume quota, which keeps
    // this test off the network.
    for _ in 0..3 {
        let resp = app
            .clone()
            .oneshot(assess_request("10.0.0.1", "192.0.2.7"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let resp = app
        .clone()
        .oneshot(assess_request("10.0.0.1", "192.0.2.7"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let json = parse_json(resp.into_body()).await;
    assert_eq!(json["error"], "quota_exceeded");
}

#[tokio::test]
async fn test_quota_windows_are_independent_per_client() {
    let app = test_app();

    for _ in 0..3 {
        let resp = app
            .clone()
            .oneshot(assess_request("10.0.0.1", "192.0.2.10"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
    let resp = app
        .clone()
        .oneshot(assess_request("10.0.0.1", "192.0.2.10"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different client is unaffected.
    let resp = app
        .clone()
        .oneshot(assess_request("10.0.0.1", "192.0.2.11"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
