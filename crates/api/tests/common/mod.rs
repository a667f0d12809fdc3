#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use coursedesk_api::auth::{issue_token, Claims};
use coursedesk_api::config::{AppConfig, StoreBackend};
use coursedesk_api::state::AppState;
use coursedesk_core::store::MemoryStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Config for in-process tests: memory store, permissive CORS.
pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        store: StoreBackend::Memory,
        jwt_secret: JWT_SECRET.to_string(),
        max_body_bytes: 64 * 1024,
        ..AppConfig::default()
    }
}

/// Build the full application router, with the same middleware stack as
/// `main`, over a fresh in-memory store.
pub fn build_test_app() -> Router {
    coursedesk_api::app(AppState::new(Arc::new(MemoryStore::new()), test_config()))
}

pub fn bearer_token() -> String {
    let mut claims = Claims::new("u-1", "editor@example.com", "admin", chrono::Duration::hours(1));
    claims.name = Some("Editor".into());
    issue_token(&claims, JWT_SECRET).unwrap()
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    send_with(app, method, uri, body, None).await
}

pub async fn send_with(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn course(internal: &str, title: &str, slug: &str) -> Value {
    json!({
        "programInternalName": internal,
        "programTitle": title,
        "category": "academics",
        "meta": {"slug": slug}
    })
}

/// Create a course and return its identity.
pub async fn create_course(app: &Router, body: Value) -> String {
    let response = post_json(app, "/api/courses", body).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["_id"].as_str().unwrap().to_string()
}
