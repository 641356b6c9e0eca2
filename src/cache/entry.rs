//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use tokio::time::Instant;

use crate::cache::Expiry;

// == Cache Entry ==
/// A stored value together with its absolute expiry deadline.
///
/// The value and the deadline are always replaced together, so a reader
/// never observes one without the other.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry written at `now` with the given expiry policy.
    pub fn new(value: V, expiry: Expiry, now: Instant) -> Self {
        Self {
            value,
            expires_at: expiry.deadline_from(now),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// An entry is expired once `now` reaches its deadline, so a zero TTL
    /// expires immediately. Entries without a deadline never expire.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}
