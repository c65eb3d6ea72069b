//! Application error type and its HTTP representation.
//!
//! Every handler returns `Result<_, AppError>`. Storage and validation errors
//! are converted with `?`; internal failures are logged here and reach the
//! client as a generic 500 without internal detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::repositories::StorageError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned in the `error` field.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Conflict { constraint } => AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": constraint }),
            ),
            other => {
                tracing::error!(error = %other, "Storage operation failed");
                AppError::internal("Internal server error", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::bad_request("bad", json!({})).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("missing", json!({})).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::conflict("taken", json!({})).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::internal("boom", json!({})).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_conflict_maps_to_conflict() {
        let err: AppError = StorageError::Conflict {
            constraint: Some("urls_short_alias_key".to_string()),
        }
        .into();

        assert!(matches!(err, AppError::Conflict { .. }));
        let info = err.to_error_info();
        assert_eq!(info.details["constraint"], "urls_short_alias_key");
    }

    #[test]
    fn test_storage_failure_hides_details() {
        let err: AppError = StorageError::Timeout(Duration::from_millis(50)).into();

        let info = err.to_error_info();
        assert_eq!(info.code, "internal_error");
        assert_eq!(info.details, json!({}));
        assert!(!info.message.contains("timed out"));
    }
}
