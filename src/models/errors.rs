use thiserror::Error;

/// Service-level errors that can occur while handling a route
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

/// Repository-level errors for document store access
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Invalid document identifier: {id}")]
    InvalidIdentifier { id: String },

    #[error("Document conversion error: {message}")]
    Conversion { message: String },

    #[error("MongoDB error: {source}")]
    Driver {
        #[from]
        source: mongodb::error::Error,
    },
}

/// Validation errors for request input
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid field value: {field}={value}, reason={reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid format: {field}, expected={expected}")]
    InvalidFormat { field: String, expected: String },

    #[error("Value out of range: {field}, min={min}, max={max}, value={value}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::ValidationError {
            message: err.to_string(),
        }
    }
}

impl From<bson::ser::Error> for RepositoryError {
    fn from(err: bson::ser::Error) -> Self {
        RepositoryError::Conversion {
            message: err.to_string(),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
