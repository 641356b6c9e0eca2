//! Cache Store Module
//!
//! Main cache engine: a HashMap of entries behind a reader/writer lock, with
//! read-time expiry checks and an optional background sweep.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheEntry, Expiry};
use crate::tasks::spawn_sweep_task;

/// Sweep interval that disables the background sweep.
pub const NEVER_SWEEP: Duration = Duration::ZERO;

// == Entry Map ==
/// Key/entry storage shared between a [`HashCache`] and its sweep task.
#[derive(Debug)]
pub(crate) struct EntryMap<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

pub(crate) type SharedEntries<V> = Arc<RwLock<EntryMap<V>>>;

impl<V> EntryMap<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: String, entry: CacheEntry<V>) {
        self.entries.insert(key, entry);
    }

    /// Returns the value for `key` unless it is absent or expired at `now`.
    pub(crate) fn get(&self, key: &str, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| &entry.value)
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    // == Purge Expired ==
    /// Removes every entry expired at `now`. Returns the number removed.
    pub(crate) fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }
}

// == Hash Cache ==
/// Concurrency safe in-memory cache with per-entry expiry.
///
/// Reads take a shared lock and never return an expired entry. Writes,
/// deletes and the background sweep take the exclusive lock. The sweep only
/// reclaims memory; expiry is always enforced at read time.
///
/// Dropping the cache closes it.
pub struct HashCache<V> {
    /// Entries, shared with the sweep task
    entries: SharedEntries<V>,
    /// Shutdown signal observed by the sweep task
    shutdown_tx: watch::Sender<bool>,
    /// Set once by the first close
    closed: AtomicBool,
    /// Sweep task handle, taken by `shutdown`
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> HashCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a new cache, sweeping expired entries every `sweep_interval`.
    ///
    /// A zero interval ([`NEVER_SWEEP`]) disables the sweep.
    ///
    /// # Panics
    /// Panics if a sweep is requested outside of a Tokio runtime.
    pub fn new(sweep_interval: Duration) -> Self {
        let entries = Arc::new(RwLock::new(EntryMap::new()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let sweeper = if sweep_interval.is_zero() {
            debug!("Cache created without background sweep");
            None
        } else {
            spawn_sweep_task(entries.clone(), sweep_interval, shutdown_rx)
        };

        Self {
            entries,
            shutdown_tx,
            closed: AtomicBool::new(false),
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Creates a cache without a background sweep.
    pub fn without_sweep() -> Self {
        Self::new(NEVER_SWEEP)
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// The expiry clock starts now, so overwriting a key restarts its TTL.
    pub fn set(&self, key: impl Into<String>, value: V, expiry: impl Into<Expiry>) {
        let entry = CacheEntry::new(value, expiry.into(), Instant::now());
        self.entries.write().insert(key.into(), entry);
    }

    /// Stores `value` under `key` without expiry.
    pub fn set_indefinite(&self, key: impl Into<String>, value: V) {
        self.set(key, value, Expiry::Never);
    }

    // == Get ==
    /// Retrieves a clone of the value for `key` if present and not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.read().get(key, Instant::now()).cloned()
    }
}

impl<V> HashCache<V> {
    // == Delete ==
    /// Removes the entry for `key`. Absent keys are ignored.
    pub fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    // == Length ==
    /// Returns the number of stored entries, including expired entries the
    /// sweep has not reclaimed yet.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // == Close ==
    /// Stops the background sweep. Entries are kept.
    ///
    /// Returns without waiting for the sweep task to exit, but no sweep pass
    /// mutates the store once this returns. Repeated calls are no-ops.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            warn!("Cache already closed");
            return;
        }

        // Signalling under the write lock orders it after any in-flight pass.
        let _guard = self.entries.write();
        self.shutdown_tx.send_replace(true);
        debug!("Cache closed");
    }

    // == Shutdown ==
    /// Closes the cache and waits for the sweep task to exit.
    pub async fn shutdown(&self) {
        if !self.is_closed() {
            self.close();
        }

        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "Sweep task did not exit cleanly");
            }
        }
    }
}

impl<V> Drop for HashCache<V> {
    fn drop(&mut self) {
        if !self.is_closed() {
            self.close();
        }
    }
}

impl<V> Cache<V> for HashCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn set(&self, key: &str, value: V, expiry: Expiry) {
        HashCache::set(self, key, value, expiry);
    }

    fn get(&self, key: &str) -> Option<V> {
        HashCache::get(self, key)
    }

    fn delete(&self, key: &str) {
        HashCache::delete(self, key);
    }

    fn len(&self) -> usize {
        HashCache::len(self)
    }

    fn close(&self) {
        HashCache::close(self);
    }
}
