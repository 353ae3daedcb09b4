use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
    Extension,
};
use serde_json::Value;
use tracing::instrument;

use super::{
    forbidden, json_rejection_to_response, query_rejection_to_response,
    service_error_to_response, ApiResult, ApiState,
};
use crate::auth::Claims;
use crate::models::{DeleteResponse, InsertOneResponse, ListOrdersQuery};

/// `GET /orderedFoods?email=`, behind [`super::require_token`].
///
/// The session's email must match the requested one.
#[instrument(name = "list_orders", skip_all)]
pub async fn list_orders(
    State(state): State<ApiState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query.map_err(query_rejection_to_response)?;

    if !claims.matches_email(query.email.as_deref()) {
        crate::warn_with_trace!(
            token_email = ?claims.email,
            requested_email = ?query.email,
            "Order listing for another buyer refused"
        );
        state.metrics.record_auth_decision("forbidden");
        return Err(forbidden());
    }

    state
        .order_service
        .list_orders(&query)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "create_order", skip_all)]
pub async fn create_order(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<InsertOneResponse>> {
    let Json(body) = body.map_err(json_rejection_to_response)?;

    state
        .order_service
        .create_order(body)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "delete_order", skip(state))]
pub async fn delete_order(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    state
        .order_service
        .delete_order(&id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}
