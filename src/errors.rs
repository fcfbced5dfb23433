//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion. Error bodies are a flat
//! `{"error": "message"}` object as expected by the dashboard client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Distinct from InvalidCredentials: the account exists but was
    /// deactivated by an admin. Surfaced as 403, not 401.
    #[error("Account is deactivated. Contact your administrator.")]
    AccountDeactivated,

    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,

    // Invitations
    #[error("Invalid invitation token")]
    InvalidToken,

    #[error("Invitation has expired")]
    InvitationExpired,

    #[error("An account with this email already exists")]
    UserAlreadyExists,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    /// Delete refused because dependent rows exist and `force` was not set.
    #[error("{0} has dependent records. Use force to delete them as well.")]
    HasDependents(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body: `{"error": "message"}`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    /// Get HTTP status code
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::AccountDeactivated => StatusCode::FORBIDDEN,
            AppError::NotFound | AppError::InvalidToken => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::HasDependents(_) | AppError::UserAlreadyExists => {
                StatusCode::CONFLICT
            }
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::InvitationExpired
            | AppError::IncorrectCurrentPassword => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            // Hide details for internal/security errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Business failures carry their full message
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn has_dependents(entity: impl Into<String>) -> Self {
        AppError::HasDependents(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// True when the underlying database error is a unique-constraint hit,
    /// e.g. two creates racing on the same generated student number.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(e) => {
                matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deactivated_maps_to_forbidden_with_distinct_message() {
        let err = AppError::AccountDeactivated;
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(err.user_message().contains("deactivated"));
    }

    #[test]
    fn invalid_credentials_is_unauthorized() {
        assert_eq!(
            AppError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn dependents_conflict_is_409() {
        assert_eq!(
            AppError::has_dependents("Course").status(),
            StatusCode::CONFLICT
        );
    }
}
