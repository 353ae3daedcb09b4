use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::CorsConfig;
use crate::handlers::{
    count_foods, create_food, create_order, create_user, delete_order, get_food, health_check,
    issue_token, list_foods, list_orders, list_users, metrics_handler, record_order_count,
    replace_food, require_token, root, sign_out, ApiState, AuthState,
};
use crate::observability::{observability_middleware, Metrics};

/// Credentialed CORS for the configured front-end origins
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .origins()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// Full routing table. Only `GET /orderedFoods` sits behind the token gate.
pub fn create_app(
    metrics: Arc<Metrics>,
    api_state: ApiState,
    auth_state: AuthState,
    cors: CorsLayer,
) -> Router {
    let metrics_for_middleware = metrics.clone();
    let token_gate = middleware::from_fn_with_state(auth_state.clone(), require_token);

    Router::new()
        .route("/", get(root))
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
        .route("/jwt", post(issue_token))
        .route("/signOut", post(sign_out))
        .with_state(auth_state)
        .route("/foods", get(list_foods).post(create_food))
        .route(
            "/foods/:id",
            get(get_food).put(replace_food).patch(record_order_count),
        )
        .route("/foodsCount", get(count_foods))
        .route(
            "/orderedFoods",
            get(list_orders).route_layer(token_gate).post(create_order),
        )
        .route("/orderedFoods/:id", delete(delete_order))
        .route("/users", get(list_users).post(create_user))
        .with_state(api_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}
