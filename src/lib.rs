//! Simple Cache - A concurrency safe in-memory cache
//!
//! Provides a key/value cache with per-entry TTL expiry and a background
//! expiry sweep, plus a minimal HTTP transaction layer mapping
//! GET/PUT/DELETE onto cache operations.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
mod tasks;

pub use api::{create_router, AppState};
pub use cache::{Cache, Expiry, HashCache, PartitionedCache};
pub use config::Config;
