//! Auth Error Types
//!
//! Auth-specific variants that convert into the unified
//! `kernel::error::AppError` response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Account is suspended")]
    AccountSuspended,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Session not found or expired")]
    SessionInvalid,

    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    #[error("Invalid API key")]
    ApiKeyInvalid,

    #[error("API key not found")]
    ApiKeyNotFound,

    #[error("API key is revoked")]
    ApiKeyRevoked,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Input rejected by a value object; carries its message and hint
    #[error("{}", .0.message())]
    Validation(AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound | AuthError::ApiKeyNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::ApiKeyRevoked => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::SessionInvalid
            | AuthError::SessionFingerprintMismatch
            | AuthError::ApiKeyInvalid => ErrorKind::Unauthorized,
            AuthError::AccountLocked => ErrorKind::Locked,
            AuthError::AccountSuspended | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::MissingHeader(_) => ErrorKind::BadRequest,
            AuthError::Validation(e) => e.kind(),
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(e) => {
                let err = AppError::new(e.kind(), e.message().to_string());
                match e.action() {
                    Some(action) => err.with_action(action.to_string()),
                    None => err,
                }
            }
            AuthError::AccountLocked => AppError::locked(self.to_string()).with_action(format!(
                "Try again in {} minutes",
                crate::domain::entity::auth::Auth::LOCKOUT_MINUTES
            )),
            // Storage details stay in the logs
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::SessionFingerprintMismatch => {
                tracing::warn!("Session fingerprint mismatch detected");
            }
            AuthError::ApiKeyInvalid => {
                tracing::warn!("Request with unknown or revoked API key");
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

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            AuthError::Validation(err)
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<platform::client::FingerprintError> for AuthError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                AuthError::MissingHeader(header)
            }
        }
    }
}
