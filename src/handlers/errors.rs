use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::models::ServiceError;

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult<T> = Result<T, ApiError>;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized access!";
pub const FORBIDDEN_MESSAGE: &str = "forbidden access!";

/// `{"message", "timestamp"}` error body
pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({
            "message": message.into(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

pub fn unauthorized() -> ApiError {
    error_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
}

pub fn forbidden() -> ApiError {
    error_response(StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE)
}

pub fn service_error_to_response(err: ServiceError) -> ApiError {
    match err {
        ServiceError::ValidationError { .. } => {
            warn!(error = %err, "Rejected request");
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        ServiceError::Repository { source } => {
            crate::error_with_trace!(error = %source, "Document store failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub fn auth_error_to_response(err: AuthError) -> ApiError {
    match err {
        AuthError::MissingToken | AuthError::InvalidToken { .. } => unauthorized(),
        AuthError::Signing { .. } => {
            error!(error = %err, "Token signing failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Malformed or mistyped JSON bodies are a client error
pub fn json_rejection_to_response(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Invalid request body");
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Invalid query parameters");
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid query parameters: {}", rejection.body_text()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryError;

    #[test]
    fn test_error_body_shape() {
        let (status, Json(body)) = forbidden();

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "forbidden access!");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_store_failure_hides_details() {
        let (status, Json(body)) = service_error_to_response(ServiceError::Repository {
            source: RepositoryError::InvalidIdentifier {
                id: "xyz".to_string(),
            },
        });

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let (status, _) = service_error_to_response(ServiceError::ValidationError {
            message: "size out of range".to_string(),
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_auth_errors_map_to_unauthorized() {
        let (status, Json(body)) = auth_error_to_response(AuthError::MissingToken);

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized access!");
    }
}
