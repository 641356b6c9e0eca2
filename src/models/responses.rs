//! Response DTOs for the cache server API
//!
//! Successful transactions answer with raw bytes or an empty body; only
//! errors carry a JSON document.

use serde::Serialize;

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
