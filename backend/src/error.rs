//! Error handling for the AutoPeças Manager server
//!
//! Every failure surfaces to the HTTP boundary as
//! `{"success": false, "error": "<message>"}` with a status code matching
//! the error kind. Services return `AppError` and never panic on bad input.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error taxonomy
#[derive(Error, Debug)]
pub enum AppError {
    // Caller's fault: malformed or missing input, no side effects
    #[error("Validation error: {0}")]
    Validation(String),

    // Referenced resource absent
    #[error("{0} not found")]
    NotFound(String),

    // Requested quantity exceeds what is on hand
    #[error("Insufficient stock for part: {part}")]
    InsufficientStock { part: String },

    // Illegal status change, or edit/delete of a delivered sale
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    // Session/credential problems
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Uniqueness conflicts and state conflicts on catalog records
    #[error("Conflict: {0}")]
    Conflict(String),

    // Unexpected store failures
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    Unexpected(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::InsufficientStock { .. }
            | AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Never leak driver/store details to the client
            AppError::Database(_) => "A database error occurred".to_string(),
            AppError::Unexpected(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }

        let body = ErrorBody {
            success: false,
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("Sale".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InsufficientStock { part: "Válvula".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidTransition("DELIVERED -> PENDING".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Forbidden("admins only".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_database_errors_are_masked() {
        let err = AppError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.public_message(), "A database error occurred");
    }

    #[test]
    fn test_insufficient_stock_names_the_part() {
        let err = AppError::InsufficientStock { part: "Pastilha de Freio".into() };
        assert!(err.public_message().contains("Pastilha de Freio"));
    }
}
