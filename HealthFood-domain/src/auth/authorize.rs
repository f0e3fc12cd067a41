use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::logging::{log_access_denied, log_auth_event, AuthEvent, AuthEventType};
use crate::auth::CurrentUser;

/// Lets the request through when the authenticated user holds `role`,
/// otherwise answers 403. Must run after `auth_middleware`.
async fn check_role(req: Request<Body>, next: Next, role: &'static str) -> Response {
    let request_path = req.uri().path().to_string();

    let Some(user) = req.extensions().get::<CurrentUser>().cloned() else {
        warn!("No authenticated user in request extensions for path: {}", request_path);
        log_auth_event(
            AuthEvent::new(AuthEventType::AccessDenied, None, false)
                .with_details("Authentication context missing")
                .with_resource(request_path)
                .with_auth_method("rbac"),
        );
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized",
                "message": "Authentication required"
            })),
        )
            .into_response();
    };

    if user.role == role {
        debug!("User {} has role {} for {}", user.id, role, request_path);
        return next.run(req).await;
    }

    log_access_denied(user.id, &request_path, role);
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": "You don't have permission to access this resource",
            "required_role": role
        })),
    )
        .into_response()
}

/// Middleware factory that requires a specific role
///
/// ```ignore
/// let admin_routes = Router::new()
///     .route("/api/stats", get(system_stats))
///     .layer(middleware::from_fn(require_role(ROLE_ADMIN)));
/// ```
pub fn require_role(
    role: &'static str,
) -> impl Fn(Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    move |req, next| Box::pin(check_role(req, next, role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn user(role: &str) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "someone@example.com".to_string(),
            full_name: "Some One".to_string(),
            role: role.to_string(),
            token: "token".to_string(),
        }
    }

    fn app(current: Option<CurrentUser>) -> Router {
        let router = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .layer(middleware::from_fn(require_role("admin")));

        match current {
            Some(current) => router.layer(axum::Extension(current)),
            None => router,
        }
    }

    fn request() -> Request<Body> {
        Request::builder().uri("/admin").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn matching_role_passes() {
        let response = app(Some(user("admin"))).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn other_role_is_forbidden() {
        let response = app(Some(user("user"))).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let response = app(None).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
