use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use health_food_domain::auth::CurrentUser;
use health_food_domain::entities::{Food, SystemStatistics};

use crate::api::state::AppState;
use crate::entities::common::{ApiResult, ErrorResponse, MessageResponse};
use crate::entities::foods::{FoodListParams, PublicFoodRequest};

/// Search the food catalogue
#[utoipa::path(
    get,
    path = "/api/foods",
    params(FoodListParams),
    responses(
        (status = 200, description = "Matching foods", body = [Food]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "foods"
)]
#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    Query(params): Query<FoodListParams>,
) -> ApiResult<Json<Vec<Food>>> {
    Ok(Json(state.services.foods.list(params.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/foods/{food_id}",
    params(("food_id" = i64, Path, description = "Food ID")),
    responses(
        (status = 200, description = "Food found", body = Food),
        (status = 404, description = "Food not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "foods"
)]
#[instrument(skip(state))]
pub async fn get_food(State(state): State<AppState>, Path(food_id): Path<i64>) -> ApiResult<Json<Food>> {
    Ok(Json(state.services.foods.get(food_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/foods",
    request_body = PublicFoodRequest,
    responses(
        (status = 201, description = "Food created", body = Food),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
        (status = 409, description = "Food name already exists", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "foods"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_food(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<PublicFoodRequest>,
) -> ApiResult<impl IntoResponse> {
    let food = state.services.foods.create(request.into(), user.id).await?;
    info!("Created food {}", food.id);
    Ok((StatusCode::CREATED, Json(food)))
}

#[utoipa::path(
    put,
    path = "/api/foods/{food_id}",
    params(("food_id" = i64, Path, description = "Food ID")),
    request_body = PublicFoodRequest,
    responses(
        (status = 200, description = "Food updated", body = Food),
        (status = 403, description = "Administrators only", body = ErrorResponse),
        (status = 404, description = "Food not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "foods"
)]
#[instrument(skip(state, request))]
pub async fn update_food(
    State(state): State<AppState>,
    Path(food_id): Path<i64>,
    Json(request): Json<PublicFoodRequest>,
) -> ApiResult<Json<Food>> {
    Ok(Json(state.services.foods.update(food_id, request.into()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/foods/{food_id}",
    params(("food_id" = i64, Path, description = "Food ID")),
    responses(
        (status = 200, description = "Food deleted", body = MessageResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
        (status = 404, description = "Food not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "foods"
)]
#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    Path(food_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.foods.delete(food_id).await?;
    Ok(Json(MessageResponse::new("Food deleted")))
}

/// System-wide counts for administrators
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "System statistics", body = SystemStatistics),
        (status = 403, description = "Administrators only", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn system_stats(State(state): State<AppState>) -> ApiResult<Json<SystemStatistics>> {
    Ok(Json(state.services.stats.system().await?))
}
