//! Request Extractors
//!
//! Drop-in replacements for `axum::Json` and `axum::extract::Query` whose
//! rejections are [`AppError`]s, so a malformed body or query string gets
//! the same JSON error body as every other failure.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::rejection::{JsonRejection, QueryRejection};

use crate::error::app_error::AppError;
use crate::error::kind::ErrorKind;

/// JSON request body
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match rejection {
            JsonRejection::JsonDataError(_) => ErrorKind::UnprocessableEntity,
            _ => ErrorKind::BadRequest,
        };
        AppError::new(kind, rejection.body_text()).with_source(rejection)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text()).with_source(rejection)
    }
}
