use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use tracing::{info, instrument};

use health_food_domain::auth::CurrentUser;
use health_food_domain::entities::{AccountOverview, AuthSession, UserStatistics};

use crate::api::state::AppState;
use crate::entities::auth::{PublicLoginRequest, PublicRegistrationRequest};
use crate::entities::common::{validate_request, ApiResult, ErrorResponse, MessageResponse};

/// Create an account with a default profile
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = PublicRegistrationRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthSession),
        (status = 400, description = "Invalid data or email already registered", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<PublicRegistrationRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_request(&request)?;
    let session = state.services.accounts.register(request.into()).await?;
    info!("Registered user {}", session.user.id);
    Ok((StatusCode::CREATED, Json(session)))
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = PublicLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSession),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<PublicLoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state.services.accounts.login(&request.email, &request.password).await?;
    Ok(Json(session))
}

/// Revoke the current token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.accounts.logout(&user).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

/// The signed-in account
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current account", body = AccountOverview),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<AccountOverview>> {
    Ok(Json(state.services.accounts.me(&user).await?))
}

/// Counts of what the account owns
#[utoipa::path(
    get,
    path = "/api/me/stats",
    responses(
        (status = 200, description = "Per-account statistics", body = UserStatistics),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn my_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<UserStatistics>> {
    Ok(Json(state.services.stats.user(user.id).await?))
}
