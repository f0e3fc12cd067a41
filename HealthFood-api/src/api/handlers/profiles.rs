use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use health_food_domain::auth::CurrentUser;
use health_food_domain::entities::HealthProfile;

use crate::api::state::AppState;
use crate::entities::common::{ApiResult, ErrorResponse, MessageResponse};
use crate::entities::profiles::{PublicProfileRequest, PublicProfileUpdateRequest};

/// Profiles of the signed-in account
#[utoipa::path(
    get,
    path = "/api/profiles",
    responses(
        (status = 200, description = "Profiles, default first", body = [HealthProfile]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_profiles(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<HealthProfile>>> {
    Ok(Json(state.services.profiles.list(user.id).await?))
}

/// Create a profile; free-text conditions are standardized by the AI
#[utoipa::path(
    post,
    path = "/api/profiles",
    request_body = PublicProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = HealthProfile),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 409, description = "Profile name already used", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<PublicProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.services.profiles.create(user.id, request.into()).await?;
    info!("Created profile {}", profile.id);
    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile found", body = HealthProfile),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
) -> ApiResult<Json<HealthProfile>> {
    Ok(Json(state.services.profiles.get(profile_id, user.id).await?))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    request_body = PublicProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = HealthProfile),
        (status = 400, description = "Invalid data or nothing to update", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    Json(request): Json<PublicProfileUpdateRequest>,
) -> ApiResult<Json<HealthProfile>> {
    let profile = state
        .services
        .profiles
        .update(profile_id, user.id, request.into())
        .await?;
    Ok(Json(profile))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile deleted", body = MessageResponse),
        (status = 400, description = "Last profile of the account", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.profiles.delete(profile_id, user.id).await?;
    Ok(Json(MessageResponse::new("Profile deleted")))
}
