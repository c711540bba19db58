//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions::classify_sqlx, kind::ErrorKind};
use thiserror::Error;

use crate::application::token::TokenError;
use crate::domain::notifier::NotifyError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Email or user name already registered
    #[error("User with this email or username already exists")]
    UserExists,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No token in cookie or Authorization header
    #[error("Authentication required. Please login.")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired. Please login again.")]
    TokenExpired,

    /// Token refers to a user that no longer exists
    #[error("User not found")]
    UnknownUser,

    /// Role check ran without an authenticated user attached
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Account is temporarily locked due to too many failed login attempts. Please try again later.")]
    AccountLocked,

    /// Inactive account on login or on a protected request
    #[error("Account is deactivated")]
    AccountDeactivated,

    /// Inactive account on the password reset flows
    #[error("Account is deactivated. Please contact support.")]
    AccountDisabled,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,

    #[error("New password must be different from current password")]
    SamePassword,

    #[error("Invalid or expired password reset token")]
    InvalidResetToken,

    /// Administrative lookup of a missing user
    #[error("User not found")]
    UserNotFound,

    #[error("You cannot delete your own account")]
    CannotDeleteSelf,

    /// Reset mail could not be delivered; the issued token was withdrawn
    #[error("Failed to send password reset email. Please try again later.")]
    ResetDeliveryFailed(#[source] NotifyError),

    /// Unexpected failure while performing a named operation
    #[error("{operation}")]
    Failed {
        operation: &'static str,
        detail: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        AuthError::Validation(message.into())
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::SamePassword
            | AuthError::InvalidResetToken
            | AuthError::CannotDeleteSelf => ErrorKind::BadRequest,
            AuthError::UserExists => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::UnknownUser
            | AuthError::NotAuthenticated
            | AuthError::AccountDeactivated
            | AuthError::CurrentPasswordIncorrect => ErrorKind::Unauthorized,
            AuthError::AccountLocked => ErrorKind::Locked,
            AuthError::AccountDisabled | AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Database(e) => classify_sqlx(e).0,
            AuthError::ResetDeliveryFailed(_)
            | AuthError::Failed { .. }
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Attach the failing operation to unexpected (5xx) errors.
    ///
    /// Domain failures pass through unchanged; everything else becomes a
    /// 500 whose message names `operation` and whose detail is the cause.
    pub fn during(self, operation: &'static str) -> Self {
        match self {
            AuthError::ResetDeliveryFailed(_) | AuthError::Failed { .. } => self,
            e if e.kind().is_server_error() => AuthError::Failed {
                operation,
                detail: e.to_string(),
            },
            e => e,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Failed { operation, detail } => {
                AppError::internal(*operation).with_detail(detail.clone())
            }
            AuthError::Database(e) => AppError::new(self.kind(), classify_sqlx(e).1),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Failed { operation, detail } => {
                tracing::error!(operation, detail = %detail, "Auth operation failed");
            }
            AuthError::ResetDeliveryFailed(e) => {
                tracing::error!(error = %e, "Password reset email not delivered");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::InvalidToken => {
                tracing::warn!("Rejected invalid token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

/// Value-object failures: client errors become `Validation`, the rest `Internal`
impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.kind() == ErrorKind::BadRequest {
            AuthError::Validation(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Signing => AuthError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::AccountLocked.kind().status_code(), 423);
        assert_eq!(AuthError::AccountDeactivated.kind().status_code(), 401);
        assert_eq!(AuthError::AccountDisabled.kind().status_code(), 403);
        assert_eq!(AuthError::UserExists.kind().status_code(), 409);
        assert_eq!(AuthError::SamePassword.kind().status_code(), 400);
        assert_eq!(AuthError::UserNotFound.kind().status_code(), 404);
        assert_eq!(AuthError::UnknownUser.kind().status_code(), 401);
    }

    #[test]
    fn test_during_wraps_only_server_errors() {
        let wrapped = AuthError::Internal("boom".to_string()).during("Login failed");
        let app = wrapped.to_app_error();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.message(), "Login failed");
        assert_eq!(app.detail(), Some("Internal error: boom"));

        let passed = AuthError::InvalidCredentials.during("Login failed");
        assert!(matches!(passed, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_during_keeps_reset_delivery_message() {
        let err = AuthError::ResetDeliveryFailed(NotifyError::NotConfigured)
            .during("Error processing password reset request");
        assert_eq!(
            err.to_app_error().message(),
            "Failed to send password reset email. Please try again later."
        );
    }

    #[test]
    fn test_from_app_error() {
        let err: AuthError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "Invalid email format"));

        let err: AuthError = AppError::internal("hash").into();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
