//! API Routes
//!
//! Configures the Axum router for the cache transaction API.

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{transaction_handler, AppState};

/// Creates the router serving cache transactions.
///
/// Every path is a cache key, so the transaction handler is installed as the
/// fallback rather than on fixed routes.
///
/// # Middleware
/// - Body limit: PUT bodies above `state.max_body_bytes` are rejected with 413
/// - Tracing: logs all requests and failed responses
pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .fallback(transaction_handler)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
