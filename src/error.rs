//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// The domain error behind this failure, if any
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Check if this failure came from the store layer
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::Store(_))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            AppError::Domain(domain_err) => match domain_err {
                // 400 Bad Request
                DomainError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
                }
                DomainError::InvalidStatus(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_status", None)
                }
                DomainError::RoomLimitReached { .. } => {
                    (StatusCode::BAD_REQUEST, "room_limit_reached", None)
                }
                DomainError::NoVacantBeds { room_no } => {
                    (StatusCode::BAD_REQUEST, "no_vacant_beds", Some(room_no.to_string()))
                }

                // 404 Not Found
                DomainError::GuestNotFound(id) => {
                    (StatusCode::NOT_FOUND, "guest_not_found", Some(id.clone()))
                }
                DomainError::RoomNotFound(room_no) => {
                    (StatusCode::NOT_FOUND, "room_not_found", Some(room_no.to_string()))
                }

                // 409 Conflict
                DomainError::DuplicateMobileNumber(mobile) => {
                    (StatusCode::CONFLICT, "duplicate_mobile_number", Some(mobile.clone()))
                }

                // 422 Unprocessable Entity
                DomainError::InvalidBeds { .. } | DomainError::InvalidCounters(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", Some(domain_err.to_string()))
                }
            },

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
