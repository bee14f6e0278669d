//! API Error Handling
//!
//! Unified error type for API responses. Every non-2xx response carries a
//! machine-readable `{ "error": code, "message": text }` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use observix_core::dto::error::ErrorBody;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(String),
    InvalidSpec(String),
    DatabaseError(sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::InvalidSpec(msg) => (StatusCode::BAD_REQUEST, "invalid_spec", msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_error",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
