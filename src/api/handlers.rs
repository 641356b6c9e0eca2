//! API Handlers
//!
//! Translates HTTP transactions into cache operations. The request path is
//! the cache key and the method selects the operation.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::cache::{Cache, Expiry, HashCache};
use crate::config::{Config, DEFAULT_MAX_BODY_BYTES};
use crate::error::{CacheError, Result};
use crate::models::Value;

/// Header holding the lifetime of a PUT value, e.g. `30s` or `1h30m`.
pub const CACHE_EXPIRY_HEADER: &str = "cache-expiry";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache the transactions operate on
    pub cache: Arc<dyn Cache<Value>>,
    /// Expiry for PUTs without a `cache-expiry` header
    pub default_expiry: Expiry,
    /// Maximum PUT body size in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// Creates a new AppState over the given cache with default settings.
    pub fn new(cache: Arc<dyn Cache<Value>>) -> Self {
        Self {
            cache,
            default_expiry: Expiry::Never,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Creates a new AppState over the given cache using the settings in `config`.
    pub fn from_config(cache: Arc<dyn Cache<Value>>, config: &Config) -> Self {
        Self {
            cache,
            default_expiry: config.default_expiry,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Creates a new AppState over a fresh single cache without a sweep.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(HashCache::<Value>::without_sweep()))
    }
}

/// Handler for every path and method.
///
/// - `GET` returns the stored bytes, 404 if absent or expired, 500 if the
///   value has no byte representation
/// - `PUT` stores the body, 400 if `cache-expiry` is malformed
/// - `DELETE` removes the key
/// - anything else is answered with 405
pub async fn transaction_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let key = uri.path();

    if method == Method::GET {
        get_value(&state, key)
    } else if method == Method::PUT {
        put_value(&state, key, &headers, body)
    } else if method == Method::DELETE {
        state.cache.delete(key);
        debug!(key, "Deleted value");
        Ok(StatusCode::OK.into_response())
    } else {
        debug!(key, %method, "Rejected unsupported method");
        Err(CacheError::UnsupportedMethod(method.to_string()))
    }
}

fn get_value(state: &AppState, key: &str) -> Result<Response> {
    let value = state
        .cache
        .get(key)
        .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

    let bytes = value.as_bytes().cloned().ok_or_else(|| {
        warn!(key, "Stored value has no byte representation");
        CacheError::Internal("Data format resolution error".to_string())
    })?;

    Ok(bytes.into_response())
}

fn put_value(state: &AppState, key: &str, headers: &HeaderMap, body: Bytes) -> Result<Response> {
    let expiry = parse_expiry_header(headers)?.unwrap_or(state.default_expiry);

    debug!(key, ?expiry, size = body.len(), "Storing value");
    state.cache.set(key, Value::Bytes(body), expiry);

    Ok(StatusCode::OK.into_response())
}

/// Reads the `cache-expiry` header. An absent or empty header yields `None`.
fn parse_expiry_header(headers: &HeaderMap) -> Result<Option<Expiry>> {
    let Some(raw) = headers.get(CACHE_EXPIRY_HEADER) else {
        return Ok(None);
    };

    let text = raw.to_str().map_err(|_| {
        warn!("cache-expiry header is not valid text");
        CacheError::InvalidRequest("cache-expiry header is not valid text".to_string())
    })?;
    if text.trim().is_empty() {
        return Ok(None);
    }

    text.parse::<Expiry>().map(Some).map_err(|err| {
        warn!(header = text, error = %err, "Could not parse cache-expiry header");
        CacheError::InvalidRequest(format!("Invalid cache-expiry header: {}", err))
    })
}
