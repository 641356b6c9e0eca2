//! Cache Module
//!
//! Provides concurrency safe in-memory caching with per-entry TTL expiry.

mod entry;
mod expiry;
mod partition;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use expiry::{parse_duration, Expiry, ParseDurationError};
pub use partition::{fnv1a_32, PartitionedCache};
pub use store::{HashCache, NEVER_SWEEP};

pub(crate) use store::{EntryMap, SharedEntries};

// == Cache Trait ==
/// Capability set shared by every cache implementation.
///
/// Transports hold an `Arc<dyn Cache<V>>` and never depend on a concrete
/// store. `get` returns `None` for absent and for expired keys alike.
pub trait Cache<V>: Send + Sync {
    /// Stores `value` under `key`, replacing any previous entry and its expiry.
    fn set(&self, key: &str, value: V, expiry: Expiry);

    /// Stores `value` under `key` without expiry.
    fn set_indefinite(&self, key: &str, value: V) {
        self.set(key, value, Expiry::Never);
    }

    /// Returns the value for `key`, or `None` if it is absent or expired.
    fn get(&self, key: &str) -> Option<V>;

    /// Removes `key`. Absent keys are ignored.
    fn delete(&self, key: &str);

    /// Number of stored entries, possibly including expired ones awaiting a sweep.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops background work. Calling it again has no effect.
    fn close(&self);
}
