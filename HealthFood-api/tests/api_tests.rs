use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use health_food_api::{create_app, AppState, ServerConfig};
use health_food_domain::config::AppConfig;
use health_food_domain::testing::{test_pool, ScriptedChatModel, StubSpeech};

static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

async fn test_app() -> Router {
    test_app_with(ScriptedChatModel::new()).await
}

async fn test_app_with(model: ScriptedChatModel) -> Router {
    initialize();
    let config = AppConfig::default();
    let state = AppState::with_clients(test_pool(), &config, Arc::new(model), Arc::new(StubSpeech::default()));
    state
        .services
        .accounts
        .ensure_default_admin(&config.admin)
        .await
        .unwrap();
    create_app(state, &ServerConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Register an account and return `(token, default_profile_id)`
async fn register(app: &Router, email: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": email, "password": "secret1", "full_name": "Nguyen Lan"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["default_profile_id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn test_health_reports_components() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "ok");
    assert!(body["components"].get("ai").is_some());
    assert!(body["components"].get("speech").is_some());
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = test_app().await;
    register(&app, "lan@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "LAN@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "lan@example.com");
    assert_eq!(me["profiles_count"], 1);
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "not-an-email", "password": "123", "full_name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    register(&app, "dup@example.com").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "dup@example.com", "password": "secret1", "full_name": "Nguyen Lan"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_password_and_logout() {
    let app = test_app().await;
    let (token, _) = register(&app, "out@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "out@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_crud_and_ownership() {
    let app = test_app().await;
    let (token, default_profile) = register(&app, "owner@example.com").await;
    let (other_token, _) = register(&app, "other@example.com").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/profiles",
        Some(&token),
        Some(json!({"profile_name": "Mother", "age": 62, "gender": "female"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let profile_id = created["id"].as_i64().unwrap();

    let (status, listed) = send(&app, Method::GET, "/api/profiles", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let uri = format!("/api/profiles/{}", profile_id);
    let (status, updated) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({"weight": 55.5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["weight"], 55.5);

    let (status, _) = send(&app, Method::GET, &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // The last remaining profile cannot be deleted
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/profiles/{}", default_profile),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_falls_back_without_ai() {
    let app = test_app().await;
    let (token, profile_id) = register(&app, "chat@example.com").await;

    let (status, session) = send(
        &app,
        Method::POST,
        &format!("/api/profiles/{}/chats", profile_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["id"].as_i64().unwrap();

    let uri = format!("/api/chats/{}/messages", session_id);
    let (status, reply) = send(
        &app,
        Method::POST,
        &uri,
        Some(&token),
        Some(json!({"content": "Can I eat mango?"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reply["ai_response"].as_str().unwrap().contains("not reachable"));

    let (status, messages) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::POST, &uri, Some(&token), Some(json!({"content": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_returns_model_answer() {
    let model = ScriptedChatModel::new().with_reply("Half a cup of brown rice is fine.");
    let app = test_app_with(model).await;
    let (token, profile_id) = register(&app, "answer@example.com").await;

    let (_, session) = send(
        &app,
        Method::POST,
        &format!("/api/profiles/{}/chats", profile_id),
        Some(&token),
        Some(json!({"session_name": "Rice"})),
    )
    .await;
    let uri = format!("/api/chats/{}/messages", session["id"].as_i64().unwrap());

    let (status, reply) = send(&app, Method::POST, &uri, Some(&token), Some(json!({"content": "How much rice?"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["ai_response"], "Half a cup of brown rice is fine.");

    let (_, messages) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"], "Half a cup of brown rice is fine.");

    let (other, _) = register(&app, "stranger@example.com").await;
    let (status, _) = send(&app, Method::GET, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_food_writes_need_admin() {
    let app = test_app().await;
    let (token, _) = register(&app, "eater@example.com").await;
    let food = json!({"name": "Brown rice", "category": "grain"});

    let (status, _) = send(&app, Method::POST, "/api/foods", Some(&token), Some(food.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "admin@example.com", "password": "admin123"})),
    )
    .await;
    let admin_token = admin["token"].as_str().unwrap().to_string();

    let (status, created) = send(&app, Method::POST, "/api/foods", Some(&admin_token), Some(food)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);

    let (status, found) = send(&app, Method::GET, "/api/foods?query=rice", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found[0]["name"], "Brown rice");

    let (status, stats) = send(&app, Method::GET, "/api/stats", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats.is_object());

    let (status, _) = send(&app, Method::GET, "/api/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_plan_with_fallback_analysis() {
    let app = test_app().await;
    let (token, profile_id) = register(&app, "plan@example.com").await;

    let (status, created) = send(
        &app,
        Method::POST,
        &format!("/api/profiles/{}/health-plans", profile_id),
        Some(&token),
        Some(json!({
            "title": "Lose 3 kg",
            "goal_type": "weight_loss",
            "target_value": 3.0,
            "target_unit": "kg",
            "duration_days": 14,
            "start_date": "2026-01-05",
            "available_activities": ["walking"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let plan_id = created["plan_id"].as_i64().unwrap();

    let (status, activities) = send(
        &app,
        Method::GET,
        &format!("/api/health-plans/{}/activities?date=2026-01-05", plan_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!activities.as_array().unwrap().is_empty());

    let (status, summary) = send(
        &app,
        Method::GET,
        &format!("/api/health-plans/{}/daily/2026-01-05", plan_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["completion_rate"], 0.0);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/profiles/{}/health-plans/{}", profile_id, plan_id),
        Some(&token),
        Some(json!({"status": "paused"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, paused) = send(
        &app,
        Method::GET,
        &format!("/api/profiles/{}/health-plans?status=paused", profile_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paused.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_activity_log_estimates_calories() {
    let app = test_app().await;
    let (token, profile_id) = register(&app, "log@example.com").await;
    let uri = format!("/api/profiles/{}/activity-logs", profile_id);

    let (status, log) = send(
        &app,
        Method::POST,
        &uri,
        Some(&token),
        Some(json!({
            "date": "2026-01-05",
            "activity_type": "walking",
            "duration_minutes": 30,
            "intensity": "medium"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", log);
    assert_eq!(log["calories_burned"], 210.0);

    let (status, logs) = send(&app, Method::GET, &format!("{}?limit=5", uri), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{}/{}", uri, log["id"].as_i64().unwrap()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_document_upload_rejects_non_pdf() {
    let app = test_app().await;
    let (token, profile_id) = register(&app, "doc@example.com").await;

    let boundary = "X-HEALTHFOOD-BOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
         Content-Type: text/plain\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/profiles/{}/documents", profile_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["message"], "Only PDF files are supported");
}

#[tokio::test]
async fn test_speech_endpoints() {
    let app = test_app().await;
    let (token, _) = register(&app, "voice@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/speech/tts",
        Some(&token),
        Some(json!({"text": "Xin chào"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["audio_url"].as_str().unwrap().starts_with("data:audio/mp3;base64,"));

    let (_, empty) = send(&app, Method::POST, "/api/speech/tts", Some(&token), Some(json!({"text": " "}))).await;
    assert_eq!(empty["success"], false);

    let (status, speech_status) = send(&app, Method::GET, "/api/speech/status", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(speech_status["available"], true);
}
