use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
};
use serde_json::Value;
use tracing::instrument;

use super::{
    json_rejection_to_response, query_rejection_to_response, service_error_to_response,
    ApiResult, ApiState,
};
use crate::models::{
    CountResponse, InsertOneResponse, PageQuery, PatchFoodRequest, UpdateFoodRequest,
    UpdateResponse,
};

/// `GET /foods?page=&size=`
#[instrument(name = "list_foods", skip_all)]
pub async fn list_foods(
    State(state): State<ApiState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query.map_err(query_rejection_to_response)?;

    state
        .food_service
        .list_foods(&query)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// `GET /foods/:id`, responding `null` when the food does not exist
#[instrument(name = "get_food", skip(state))]
pub async fn get_food(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let food = state
        .food_service
        .get_food(&id)
        .await
        .map_err(service_error_to_response)?;

    Ok(Json(food.unwrap_or(Value::Null)))
}

#[instrument(name = "create_food", skip_all)]
pub async fn create_food(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<InsertOneResponse>> {
    let Json(body) = body.map_err(json_rejection_to_response)?;

    state
        .food_service
        .create_food(body)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "replace_food", skip(state, body))]
pub async fn replace_food(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateFoodRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateResponse>> {
    let Json(request) = body.map_err(json_rejection_to_response)?;

    state
        .food_service
        .replace_food(&id, &request)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "record_order_count", skip(state, body))]
pub async fn record_order_count(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Result<Json<PatchFoodRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateResponse>> {
    let Json(request) = body.map_err(json_rejection_to_response)?;

    state
        .food_service
        .record_order_count(&id, request)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "count_foods", skip_all)]
pub async fn count_foods(State(state): State<ApiState>) -> ApiResult<Json<CountResponse>> {
    state
        .food_service
        .count_foods()
        .await
        .map(Json)
        .map_err(service_error_to_response)
}
