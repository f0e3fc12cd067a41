use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::NaiveDate;
use tracing::{info, instrument};

use health_food_domain::auth::CurrentUser;
use health_food_domain::entities::{
    AdjustmentResult, CreatedPlan, DailySummary, HealthPlan, PlanActivity, PlanMeal,
};

use crate::api::state::AppState;
use crate::entities::common::{ApiResult, ErrorResponse, MessageResponse};
use crate::entities::plans::{
    ActivityListParams, AdjustPlanRequest, MealCompletionRequest, PlanListParams, PlanStatusRequest,
    PublicActivityUpdateRequest, PublicPlanRequest,
};

/// Generate a plan from a goal and the profile's conditions
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/health-plans",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    request_body = PublicPlanRequest,
    responses(
        (status = 201, description = "Plan created with its daily schedule", body = CreatedPlan),
        (status = 400, description = "Invalid goal", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_plan(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    Json(request): Json<PublicPlanRequest>,
) -> ApiResult<impl IntoResponse> {
    let created = state
        .services
        .plans
        .create_plan(profile_id, user.id, request.into())
        .await?;
    info!("Created health plan {}", created.plan_id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/health-plans",
    params(("profile_id" = i64, Path, description = "Profile ID"), PlanListParams),
    responses(
        (status = 200, description = "Plans, newest first", body = [HealthPlan]),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_plans(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    Query(params): Query<PlanListParams>,
) -> ApiResult<Json<Vec<HealthPlan>>> {
    let plans = state
        .services
        .plans
        .list_plans(profile_id, user.id, params.status)
        .await?;
    Ok(Json(plans))
}

/// A plan with its analysis
#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/health-plans/{plan_id}",
    params(
        ("profile_id" = i64, Path, description = "Profile ID"),
        ("plan_id" = i64, Path, description = "Plan ID"),
    ),
    responses(
        (status = 200, description = "Plan found", body = HealthPlan),
        (status = 404, description = "Health plan not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_plan(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((profile_id, plan_id)): Path<(i64, i64)>,
) -> ApiResult<Json<HealthPlan>> {
    Ok(Json(state.services.plans.get_plan(profile_id, plan_id, user.id).await?))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/health-plans/{plan_id}",
    params(
        ("profile_id" = i64, Path, description = "Profile ID"),
        ("plan_id" = i64, Path, description = "Plan ID"),
    ),
    request_body = PlanStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = HealthPlan),
        (status = 404, description = "Health plan not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_plan_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((profile_id, plan_id)): Path<(i64, i64)>,
    Json(request): Json<PlanStatusRequest>,
) -> ApiResult<Json<HealthPlan>> {
    let plan = state
        .services
        .plans
        .update_status(profile_id, plan_id, user.id, request.status)
        .await?;
    Ok(Json(plan))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/health-plans/{plan_id}",
    params(
        ("profile_id" = i64, Path, description = "Profile ID"),
        ("plan_id" = i64, Path, description = "Plan ID"),
    ),
    responses(
        (status = 200, description = "Plan deleted with its schedule", body = MessageResponse),
        (status = 404, description = "Health plan not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_plan(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((profile_id, plan_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.plans.delete_plan(profile_id, plan_id, user.id).await?;
    Ok(Json(MessageResponse::new("Health plan deleted")))
}

/// Rescale upcoming exercise after comparing last week against the plan
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/health-plans/{plan_id}/adjust",
    params(
        ("profile_id" = i64, Path, description = "Profile ID"),
        ("plan_id" = i64, Path, description = "Plan ID"),
    ),
    request_body = AdjustPlanRequest,
    responses(
        (status = 200, description = "Deviation analysis and rewritten days", body = AdjustmentResult),
        (status = 400, description = "adjustment_days outside 1-30", body = ErrorResponse),
        (status = 404, description = "Health plan not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id, reason = ?request.reason))]
pub async fn adjust_plan(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((profile_id, plan_id)): Path<(i64, i64)>,
    Json(request): Json<AdjustPlanRequest>,
) -> ApiResult<Json<AdjustmentResult>> {
    let result = state
        .services
        .plans
        .adjust_plan(profile_id, plan_id, user.id, request.target_date, request.adjustment_days)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/health-plans/{plan_id}/daily/{date}",
    params(
        ("plan_id" = i64, Path, description = "Plan ID"),
        ("date" = String, Path, description = "Day as YYYY-MM-DD"),
    ),
    responses(
        (status = 200, description = "Activities and meals of the day", body = DailySummary),
        (status = 404, description = "Health plan not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn daily_summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((plan_id, date)): Path<(i64, NaiveDate)>,
) -> ApiResult<Json<DailySummary>> {
    Ok(Json(state.services.plans.daily_summary(plan_id, user.id, date).await?))
}

#[utoipa::path(
    get,
    path = "/api/health-plans/{plan_id}/activities",
    params(("plan_id" = i64, Path, description = "Plan ID"), ActivityListParams),
    responses(
        (status = 200, description = "Scheduled activities", body = [PlanActivity]),
        (status = 404, description = "Health plan not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(plan_id): Path<i64>,
    Query(params): Query<ActivityListParams>,
) -> ApiResult<Json<Vec<PlanActivity>>> {
    let activities = state
        .services
        .plans
        .list_activities(plan_id, user.id, params.date)
        .await?;
    Ok(Json(activities))
}

#[utoipa::path(
    put,
    path = "/api/health-plans/{plan_id}/activities/{activity_id}",
    params(
        ("plan_id" = i64, Path, description = "Plan ID"),
        ("activity_id" = i64, Path, description = "Activity ID"),
    ),
    request_body = PublicActivityUpdateRequest,
    responses(
        (status = 200, description = "Activity updated", body = PlanActivity),
        (status = 400, description = "Non-positive duration", body = ErrorResponse),
        (status = 404, description = "Plan or activity not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_activity(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((plan_id, activity_id)): Path<(i64, i64)>,
    Json(request): Json<PublicActivityUpdateRequest>,
) -> ApiResult<Json<PlanActivity>> {
    let activity = state
        .services
        .plans
        .update_activity(plan_id, activity_id, user.id, request.into())
        .await?;
    Ok(Json(activity))
}

#[utoipa::path(
    put,
    path = "/api/health-plans/{plan_id}/meals/{meal_id}",
    params(
        ("plan_id" = i64, Path, description = "Plan ID"),
        ("meal_id" = i64, Path, description = "Meal ID"),
    ),
    request_body = MealCompletionRequest,
    responses(
        (status = 200, description = "Meal updated", body = PlanMeal),
        (status = 404, description = "Plan or meal not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-plans"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_meal(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((plan_id, meal_id)): Path<(i64, i64)>,
    Json(request): Json<MealCompletionRequest>,
) -> ApiResult<Json<PlanMeal>> {
    let meal = state
        .services
        .plans
        .set_meal_completed(plan_id, meal_id, user.id, request.is_completed)
        .await?;
    Ok(Json(meal))
}
