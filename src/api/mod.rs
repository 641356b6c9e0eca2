//! API Module
//!
//! HTTP transaction layer over a cache.
//!
//! # Transactions
//! - `GET /{key}` - Retrieve the stored bytes
//! - `PUT /{key}` - Store the request body, lifetime from the `cache-expiry` header
//! - `DELETE /{key}` - Remove the key
//!
//! The full request path, leading slash included, is the cache key.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
