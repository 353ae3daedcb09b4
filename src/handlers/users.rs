use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde_json::Value;
use tracing::instrument;

use super::{json_rejection_to_response, service_error_to_response, ApiResult, ApiState};
use crate::models::InsertOneResponse;

#[instrument(name = "list_users", skip_all)]
pub async fn list_users(State(state): State<ApiState>) -> ApiResult<Json<Value>> {
    state
        .user_service
        .list_users()
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "create_user", skip_all)]
pub async fn create_user(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<InsertOneResponse>> {
    let Json(body) = body.map_err(json_rejection_to_response)?;

    state
        .user_service
        .create_user(body)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}
