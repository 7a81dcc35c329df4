//! Compliance Error Types
//!
//! Compliance-specific variants that convert into the unified
//! `kernel::error::AppError` response.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::provider::ProviderError;

pub type ComplianceResult<T> = Result<T, ComplianceError>;

#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("Verification not found")]
    VerificationNotFound,

    #[error("Report not found")]
    ReportNotFound,

    #[error("Bulk upload job not found")]
    JobNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient credits. Please upgrade your plan.")]
    InsufficientCredits,

    #[error("Invalid payment signature")]
    InvalidSignature,

    #[error("Order has already been paid")]
    OrderAlreadyPaid,

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Credit balance cannot go below zero")]
    NegativeBalance,

    #[error("You cannot suspend your own account")]
    SelfSuspension,

    #[error("Verification provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Input rejected by a value object; carries its message and hint
    #[error("{}", .0.message())]
    Validation(AppError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ComplianceError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ComplianceError::VerificationNotFound
            | ComplianceError::ReportNotFound
            | ComplianceError::JobNotFound
            | ComplianceError::OrderNotFound
            | ComplianceError::UserNotFound => ErrorKind::NotFound,
            ComplianceError::InsufficientCredits => ErrorKind::PaymentRequired,
            ComplianceError::InvalidSignature
            | ComplianceError::InvalidPlan(_)
            | ComplianceError::NegativeBalance
            | ComplianceError::SelfSuspension => ErrorKind::BadRequest,
            ComplianceError::OrderAlreadyPaid => ErrorKind::Conflict,
            ComplianceError::Provider(_) => ErrorKind::BadGateway,
            ComplianceError::Validation(e) => e.kind(),
            ComplianceError::Auth(e) => e.kind(),
            ComplianceError::Database(_) | ComplianceError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            ComplianceError::Validation(e) => {
                let err = AppError::new(e.kind(), e.message().to_string());
                match e.action() {
                    Some(action) => err.with_action(action.to_string()),
                    None => err,
                }
            }
            ComplianceError::Auth(e) => e.to_app_error(),
            ComplianceError::InsufficientCredits => {
                AppError::payment_required(self.to_string()).with_action("Upgrade your plan")
            }
            // Storage details stay in the logs
            ComplianceError::Database(_) | ComplianceError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            ComplianceError::Database(e) => {
                tracing::error!(error = %e, "Compliance database error");
            }
            ComplianceError::Internal(msg) => {
                tracing::error!(message = %msg, "Compliance internal error");
            }
            ComplianceError::Provider(e) => {
                tracing::error!(error = %e, "Verification provider failed");
            }
            ComplianceError::InvalidSignature => {
                tracing::warn!("Payment verification with invalid signature");
            }
            ComplianceError::SelfSuspension => {
                tracing::warn!("Admin attempted to suspend own account");
            }
            _ => {
                tracing::debug!(error = %self, "Compliance error");
            }
        }
    }
}

impl IntoResponse for ComplianceError {
    fn into_response(self) -> Response {
        if let ComplianceError::Auth(e) = self {
            return e.into_response();
        }
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for ComplianceError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            ComplianceError::Validation(err)
        } else {
            ComplianceError::Internal(err.to_string())
        }
    }
}
