use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use health_food_domain::auth::CurrentUser;
use health_food_domain::entities::{ActivityLog, AutoMatchResult, MealLog};

use crate::api::state::AppState;
use crate::entities::common::{ApiResult, ErrorResponse, LimitParams, MessageResponse};
use crate::entities::plans::{AutoMatchParams, PublicActivityLogRequest, PublicMealLogRequest};

/// Record an exercise; calories are estimated from intensity when omitted
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/activity-logs",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    request_body = PublicActivityLogRequest,
    responses(
        (status = 201, description = "Activity logged", body = ActivityLog),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "logs"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_activity_log(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    Json(request): Json<PublicActivityLogRequest>,
) -> ApiResult<impl IntoResponse> {
    let log = state
        .services
        .plans
        .create_activity_log(profile_id, user.id, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/activity-logs",
    params(("profile_id" = i64, Path, description = "Profile ID"), LimitParams),
    responses(
        (status = 200, description = "Most recent activity logs", body = [ActivityLog]),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "logs"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_activity_logs(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    let logs = state
        .services
        .plans
        .list_activity_logs(profile_id, user.id, params.limit)
        .await?;
    Ok(Json(logs))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/activity-logs/{log_id}",
    params(
        ("profile_id" = i64, Path, description = "Profile ID"),
        ("log_id" = i64, Path, description = "Activity log ID"),
    ),
    responses(
        (status = 200, description = "Log deleted", body = MessageResponse),
        (status = 404, description = "Log not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "logs"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_activity_log(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((profile_id, log_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .services
        .plans
        .delete_activity_log(profile_id, user.id, log_id)
        .await?;
    Ok(Json(MessageResponse::new("Activity log deleted")))
}

/// Record a meal; the total is summed from item calories when omitted
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/meal-logs",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    request_body = PublicMealLogRequest,
    responses(
        (status = 201, description = "Meal logged", body = MealLog),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "logs"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_meal_log(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    Json(request): Json<PublicMealLogRequest>,
) -> ApiResult<impl IntoResponse> {
    let log = state
        .services
        .plans
        .create_meal_log(profile_id, user.id, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/meal-logs",
    params(("profile_id" = i64, Path, description = "Profile ID"), LimitParams),
    responses(
        (status = 200, description = "Most recent meal logs", body = [MealLog]),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "logs"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_meal_logs(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Json<Vec<MealLog>>> {
    let logs = state
        .services
        .plans
        .list_meal_logs(profile_id, user.id, params.limit)
        .await?;
    Ok(Json(logs))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/meal-logs/{log_id}",
    params(
        ("profile_id" = i64, Path, description = "Profile ID"),
        ("log_id" = i64, Path, description = "Meal log ID"),
    ),
    responses(
        (status = 200, description = "Log deleted", body = MessageResponse),
        (status = 404, description = "Log not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "logs"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_meal_log(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((profile_id, log_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.plans.delete_meal_log(profile_id, user.id, log_id).await?;
    Ok(Json(MessageResponse::new("Meal log deleted")))
}

/// Link logged exercise to matching pending plan activities
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/auto-match-activities",
    params(("profile_id" = i64, Path, description = "Profile ID"), AutoMatchParams),
    responses(
        (status = 200, description = "Match counts", body = AutoMatchResult),
        (status = 400, description = "days_back outside 1-90", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "logs"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn auto_match_activities(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    Query(params): Query<AutoMatchParams>,
) -> ApiResult<Json<AutoMatchResult>> {
    let result = state
        .services
        .plans
        .auto_match_activities(profile_id, user.id, params.days_back)
        .await?;
    info!("Matched {} of {} activity logs", result.matched, result.total_checked);
    Ok(Json(result))
}
