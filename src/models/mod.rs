//! Value and response models for the cache server
//!
//! Defines what the HTTP layer stores in the cache and the shape of error
//! response bodies.

pub mod responses;
pub mod value;

// Re-export commonly used types
pub use responses::ErrorResponse;
pub use value::Value;
