use std::path::Path;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::debug;

use health_food_domain::auth::{auth_middleware, authorize, configure_security, ROLE_ADMIN};
use health_food_domain::services::documents::MAX_DOCUMENT_BYTES;

use crate::api::handlers::{auth, chat, documents, foods, health, logs, plans, profiles, speech};
use crate::api::state::{AppState, ServerConfig};
use crate::entities::common::ErrorResponse;
use crate::openapi::configure_swagger_routes;

type Frontend = ServeDir<ServeFile>;

/// Room for the multipart framing around a maximum-size upload
const UPLOAD_BODY_LIMIT: usize = MAX_DOCUMENT_BYTES + 1024 * 1024;

/// Create the application router
pub fn create_app(state: AppState, server: &ServerConfig) -> Router {
    debug!("Creating application router");
    let accounts = state.services.accounts.clone();

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let user_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/me", get(auth::me))
        .route("/api/me/stats", get(auth::my_stats))
        .route("/api/profiles", get(profiles::list_profiles).post(profiles::create_profile))
        .route(
            "/api/profiles/:profile_id",
            get(profiles::get_profile)
                .put(profiles::update_profile)
                .delete(profiles::delete_profile),
        )
        .route(
            "/api/profiles/:profile_id/documents",
            get(documents::list_documents)
                .post(documents::upload_document)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/documents/:doc_id", get(documents::get_document))
        .route(
            "/api/profiles/:profile_id/chats",
            get(chat::list_sessions).post(chat::create_session),
        )
        .route(
            "/api/chats/:session_id/messages",
            get(chat::list_messages).post(chat::send_message),
        )
        .route("/api/foods", get(foods::list_foods))
        .route("/api/foods/:food_id", get(foods::get_food))
        .route(
            "/api/profiles/:profile_id/health-plans",
            get(plans::list_plans).post(plans::create_plan),
        )
        .route(
            "/api/profiles/:profile_id/health-plans/:plan_id",
            get(plans::get_plan)
                .put(plans::update_plan_status)
                .delete(plans::delete_plan),
        )
        .route(
            "/api/profiles/:profile_id/health-plans/:plan_id/adjust",
            post(plans::adjust_plan),
        )
        .route("/api/health-plans/:plan_id/daily/:date", get(plans::daily_summary))
        .route("/api/health-plans/:plan_id/activities", get(plans::list_activities))
        .route(
            "/api/health-plans/:plan_id/activities/:activity_id",
            put(plans::update_activity),
        )
        .route("/api/health-plans/:plan_id/meals/:meal_id", put(plans::update_meal))
        .route(
            "/api/profiles/:profile_id/activity-logs",
            get(logs::list_activity_logs).post(logs::create_activity_log),
        )
        .route(
            "/api/profiles/:profile_id/activity-logs/:log_id",
            delete(logs::delete_activity_log),
        )
        .route(
            "/api/profiles/:profile_id/meal-logs",
            get(logs::list_meal_logs).post(logs::create_meal_log),
        )
        .route("/api/profiles/:profile_id/meal-logs/:log_id", delete(logs::delete_meal_log))
        .route(
            "/api/profiles/:profile_id/auto-match-activities",
            post(logs::auto_match_activities),
        )
        .route("/api/speech/tts", post(speech::text_to_speech))
        .route(
            "/api/speech/stt",
            post(speech::speech_to_text).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/speech/status", get(speech::speech_status))
        .layer(middleware::from_fn_with_state(accounts.clone(), auth_middleware));

    debug!("User routes configured");

    // Authentication must run before the role check, so it is the outer layer
    let admin_routes = Router::new()
        .route("/api/foods", post(foods::create_food))
        .route("/api/foods/:food_id", put(foods::update_food).delete(foods::delete_food))
        .route("/api/stats", get(foods::system_stats))
        .layer(middleware::from_fn(authorize::require_role(ROLE_ADMIN)))
        .layer(middleware::from_fn_with_state(accounts, auth_middleware));

    debug!("Admin routes configured");

    let frontend = server.frontend_dir.as_deref().map(frontend_service);
    let app = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .merge(configure_swagger_routes())
        .fallback(move |req: Request<Body>| fallback(frontend.clone(), req))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    configure_security(app, &server.allowed_origins)
}

/// Static files of the browser frontend, falling back to `index.html`
fn frontend_service(dir: &str) -> Frontend {
    ServeDir::new(dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(Path::new(dir).join("index.html")))
}

async fn fallback(frontend: Option<Frontend>, req: Request<Body>) -> Response {
    if req.uri().path().starts_with("/api/") {
        return ErrorResponse::not_found("API endpoint not found").into_response();
    }
    match frontend {
        Some(frontend) => match frontend.oneshot(req).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        },
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
