//! Error types for the cache server
//!
//! The cache engine itself cannot fail; these errors describe transaction
//! outcomes at the HTTP boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent or expired
    #[error("Value not found: {0}")]
    NotFound(String),

    /// Malformed request input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP method without a cache operation
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Stored value cannot be served, e.g. it has no byte representation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
