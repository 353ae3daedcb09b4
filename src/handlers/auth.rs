use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{
    auth_error_to_response, json_rejection_to_response, service_error_to_response, ApiResult,
    AuthState,
};
use crate::auth::{removal_cookie, session_cookie};
use crate::models::require_object;

/// Sign the posted claims and set them as the `token` cookie
#[instrument(name = "issue_token", skip_all)]
pub async fn issue_token(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let Json(body) = body.map_err(json_rejection_to_response)?;
    let claims = require_object(body, "claims")
        .map_err(|e| service_error_to_response(e.into()))?;

    let email = claims
        .get("email")
        .and_then(Value::as_str)
        .map(str::to_string);

    let token = state
        .tokens
        .issue(claims)
        .map_err(auth_error_to_response)?;

    state.metrics.record_auth_decision("issued");
    crate::info_with_trace!(email = ?email, "Issued session token");

    Ok((jar.add(session_cookie(token)), Json(json!({ "success": true }))))
}

/// Expire the `token` cookie
#[instrument(name = "sign_out", skip_all)]
pub async fn sign_out(jar: CookieJar, body: Bytes) -> (CookieJar, Json<Value>) {
    info!(body = %String::from_utf8_lossy(&body), "Signing out");
    (jar.add(removal_cookie()), Json(json!({ "success": true })))
}
