use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use health_food_domain::config::AppConfig;
use health_food_domain::testing::{test_pool, ScriptedChatModel, StubSpeech};

use crate::api::{create_app, AppState, ServerConfig};

fn test_app() -> Router {
    let state = AppState::with_clients(
        test_pool(),
        &AppConfig::default(),
        Arc::new(ScriptedChatModel::new()),
        Arc::new(StubSpeech::default()),
    );
    create_app(state, &ServerConfig::default())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn unknown_api_path_is_json_404() {
    let (status, body) = get(test_app(), "/api/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "API endpoint not found");
}

#[tokio::test]
async fn non_api_path_without_frontend_is_plain_404() {
    let (status, body) = get(test_app(), "/index.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn protected_route_requires_token() {
    let (status, body) = get(test_app(), "/api/profiles").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = get(test_app(), "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "HealthFood API");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
