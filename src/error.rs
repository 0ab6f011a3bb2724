use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::orders::OrderError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Every failure a handler can surface. Rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

pub(crate) const EMAIL_TAKEN: &str = "Email is already registered";

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            // Lost a race against the handler's own uniqueness check.
            StoreError::Duplicate { field: "email", .. } => {
                AppError::Validation(EMAIL_TAKEN.into())
            }
            StoreError::Duplicate { .. } => AppError::Validation(e.to_string()),
            _ => {
                log::error!("Database error: {}", e);
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingHeader
            | AuthError::MalformedHeader
            | AuthError::InvalidScheme
            | AuthError::InvalidToken(_)
            | AuthError::InvalidSubject => AppError::Unauthenticated(e.to_string()),
            AuthError::Forbidden(_) => AppError::Forbidden(e.to_string()),
            AuthError::Hashing(_) | AuthError::Signing(_) => {
                log::error!("{}", e);
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NoSellerAvailable | OrderError::OrderNotFound => {
                AppError::NotFound(e.to_string())
            }
            OrderError::RejectReasonRequired => AppError::Validation(e.to_string()),
            OrderError::AlreadyResolved => AppError::Conflict(e.to_string()),
            OrderError::Store(store) => store.into(),
        }
    }
}
