//! HTTP integration tests.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`; no socket
//! is bound.

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use devtools_core::api::handlers::{X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET};
use devtools_core::api::{create_router, AppState};
use devtools_core::types::{Config, RateLimitConfig};
use devtools_core::Orchestrator;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

/// Build an in-process app with the given per-window request limit.
fn test_app(max_requests: u32) -> (Router, Arc<Orchestrator>) {
    build_app(max_requests, false)
}

fn build_app(max_requests: u32, trust_forwarded_headers: bool) -> (Router, Arc<Orchestrator>) {
    let config = Config {
        rate_limit: RateLimitConfig {
            max_requests,
            ..RateLimitConfig::default()
        },
        ..Config::default()
    };
    let orchestrator = Arc::new(Orchestrator::from_config(&config).unwrap());
    let router = create_router(
        AppState {
            orchestrator: Arc::clone(&orchestrator),
            trust_forwarded_headers,
        },
        config.server.max_body_bytes,
    );
    (router, orchestrator)
}

/// Send one request and return status, headers and the JSON body.
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: impl Into<Body>, client: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(body.into())
        .unwrap()
}

fn post_json(uri: &str, body: Value, client: &str) -> Request<Body> {
    post(uri, body.to_string(), client)
}

/// Attach the socket peer the way `into_make_service_with_connect_info` does.
fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app(10);
    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "tools": 13}));
}

#[tokio::test]
async fn test_list_tools_and_categories() {
    let (app, _) = test_app(10);
    let (status, _, body) = send(&app, get("/api/tools")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 13);
    assert!(body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["id"] == "json-formatter"));

    let (status, _, body) = send(&app, get("/api/categories/generators/tools")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (status, _, body) = send(&app, get("/api/categories/nope/tools")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown category: nope");
}

#[tokio::test]
async fn test_get_tool_includes_options_schema() {
    let (app, _) = test_app(10);
    let (status, _, body) = send(&app, get("/api/tools/regex-tester")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "regex-tester");
    assert!(body["optionsSchema"].is_object());

    let (status, _, body) = send(&app, get("/api/tools/not-a-tool")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "tool_not_found");
}

#[tokio::test]
async fn test_run_tool_success_with_rate_headers() {
    let (app, _) = test_app(10);
    let request = post_json(
        "/api/tools/json-formatter",
        json!({"input": "{\"a\":1}", "options": {"indent": 4}}),
        "203.0.113.1",
    );
    let (status, headers, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["formatted"], "{\n    \"a\": 1\n}");
    assert!(body["metadata"]["processingTime"].is_number());
    assert_eq!(headers[X_RATELIMIT_LIMIT], "10");
    assert_eq!(headers[X_RATELIMIT_REMAINING], "9");
    assert!(headers.contains_key(X_RATELIMIT_RESET));
}

#[tokio::test]
async fn test_unknown_tool_is_not_found() {
    let (app, _) = test_app(10);
    let request = post_json("/api/tools/not-a-tool", json!({"input": "x"}), "203.0.113.2");
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_bad_options_are_bad_request() {
    let (app, _) = test_app(10);
    let request = post_json(
        "/api/tools/base64-encoder",
        json!({"input": "aGk=", "options": {"mode": "sideways"}}),
        "203.0.113.3",
    );
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_malformed_body_consumes_no_quota() {
    let (app, _) = test_app(1);
    let client = "203.0.113.4";

    let (status, headers, body) = send(&app, post("/api/tools/uuid-generator", "{not json", client)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request data"));
    assert!(!headers.contains_key(X_RATELIMIT_LIMIT));

    let (status, _, _) = send(&app, post("/api/tools/uuid-generator", r#"{"options":{}}"#, client)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = post_json("/api/tools/uuid-generator", json!({"input": ""}), client);
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let (app, _) = test_app(2);
    let client = "203.0.113.5";

    for _ in 0..2 {
        let request = post_json("/api/tools/uuid-generator", json!({"input": ""}), client);
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    let request = post_json("/api/tools/uuid-generator", json!({"input": ""}), client);
    let (status, headers, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Rate limit exceeded");
    assert_eq!(headers[X_RATELIMIT_REMAINING], "0");
    assert!(headers.contains_key("retry-after"));
}

#[tokio::test]
async fn test_trusted_forwarded_for_keys_clients_separately() {
    let (app, orchestrator) = build_app(1, true);

    let request = post_json(
        "/api/tools/uuid-generator",
        json!({"input": ""}),
        "198.51.100.7, 10.0.0.1",
    );
    assert_eq!(send(&app, request).await.0, StatusCode::OK);

    let request = post_json("/api/tools/uuid-generator", json!({"input": ""}), "198.51.100.7");
    assert_eq!(send(&app, request).await.0, StatusCode::TOO_MANY_REQUESTS);

    let request = post_json("/api/tools/uuid-generator", json!({"input": ""}), "198.51.100.8");
    assert_eq!(send(&app, request).await.0, StatusCode::OK);

    assert_eq!(orchestrator.limiter().limit(), 1);
}

#[tokio::test]
async fn test_spoofed_forwarded_for_does_not_reset_quota() {
    let (app, _) = test_app(1);
    let peer = "192.0.2.10:40000";

    let request = post_json("/api/tools/uuid-generator", json!({"input": ""}), "198.51.100.1");
    assert_eq!(send(&app, from_peer(request, peer)).await.0, StatusCode::OK);

    for spoofed in ["198.51.100.2", "198.51.100.3"] {
        let request = post_json("/api/tools/uuid-generator", json!({"input": ""}), spoofed);
        let (status, headers, _) = send(&app, from_peer(request, peer)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(headers[X_RATELIMIT_REMAINING], "0");
    }

    let request = post_json("/api/tools/uuid-generator", json!({"input": ""}), "198.51.100.1");
    assert_eq!(
        send(&app, from_peer(request, "192.0.2.11:40000")).await.0,
        StatusCode::OK
    );
}
