use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::{auth_error_to_response, ApiResult, AuthState};
use crate::auth::{AuthError, TOKEN_COOKIE};

/// Reject requests without a valid `token` cookie; on success the decoded
/// [`crate::auth::Claims`] are available as a request extension.
pub async fn require_token(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(cookie) = jar.get(TOKEN_COOKIE) else {
        crate::warn_with_trace!(path = %request.uri().path(), "Request without token cookie");
        state.metrics.record_auth_decision("missing_token");
        return Err(auth_error_to_response(AuthError::MissingToken));
    };

    let claims = match state.tokens.verify(cookie.value()) {
        Ok(claims) => claims,
        Err(e) => {
            crate::warn_with_trace!(error = %e, "Rejected session token");
            state.metrics.record_auth_decision("invalid_token");
            return Err(auth_error_to_response(e));
        }
    };

    debug!(email = ?claims.email, "Session token accepted");
    state.metrics.record_auth_decision("verified");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
