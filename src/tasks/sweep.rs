//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries until the
//! owning cache is closed.

use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{EntryMap, SharedEntries};

/// Spawns the sweep task for a cache.
///
/// The first pass runs one full `interval` after spawning. Each pass takes the
/// write lock once and removes every entry expired at the time of the pass.
/// The task exits as soon as `shutdown_rx` turns `true` or its sender is
/// dropped, without waiting for the next tick.
///
/// Returns `None` without spawning when `interval` is too large for the
/// clock to schedule a first pass.
///
/// # Arguments
/// * `entries` - Storage shared with the owning cache
/// * `interval` - Time between passes, must be non-zero
/// * `shutdown_rx` - Close signal of the owning cache
pub(crate) fn spawn_sweep_task<V>(
    entries: SharedEntries<V>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Option<JoinHandle<()>>
where
    V: Send + Sync + 'static,
{
    let Some(first_pass) = Instant::now().checked_add(interval) else {
        warn!(?interval, "Sweep interval out of range, expiry sweep disabled");
        return None;
    };

    Some(tokio::spawn(async move {
        let mut ticker = interval_at(first_pass, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(?interval, "Expiry sweep task started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }

                _ = ticker.tick() => {
                    match sweep_once(&entries, &shutdown_rx) {
                        Some(0) => debug!("Expiry sweep: no expired entries found"),
                        Some(removed) => info!(removed, "Expiry sweep: removed expired entries"),
                        None => break,
                    }
                }
            }
        }

        info!("Expiry sweep task stopped");
    }))
}

/// Runs a single pass under one write lock acquisition.
///
/// Returns `None` without touching the store if the cache was closed.
fn sweep_once<V>(
    entries: &RwLock<EntryMap<V>>,
    shutdown_rx: &watch::Receiver<bool>,
) -> Option<usize> {
    let mut guard = entries.write();
    if *shutdown_rx.borrow() {
        return None;
    }
    Some(guard.purge_expired(Instant::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, Expiry};
    use std::sync::Arc;

    fn shared_with(entries: Vec<(&str, Expiry)>) -> SharedEntries<&'static str> {
        let now = Instant::now();
        let mut map = EntryMap::new();
        for (key, expiry) in entries {
            map.insert(key.to_string(), CacheEntry::new("value", expiry, now));
        }
        Arc::new(RwLock::new(map))
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_removes_expired_entries() {
        let entries = shared_with(vec![
            ("expire_soon", Expiry::After(Duration::from_secs(1))),
            ("long_lived", Expiry::After(Duration::from_secs(3600))),
            ("indefinite", Expiry::Never),
        ]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_sweep_task(entries.clone(), Duration::from_secs(1), shutdown_rx)
            .expect("sweep task spawned");

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(entries.read().len(), 2);

        shutdown_tx.send_replace(true);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_does_not_run_before_first_interval() {
        let entries = shared_with(vec![("zero", Expiry::After(Duration::ZERO))]);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_sweep_task(entries.clone(), Duration::from_secs(60), shutdown_rx)
            .expect("sweep task spawned");

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(entries.read().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(entries.read().len(), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_exits_without_pending_tick() {
        let entries = shared_with(vec![]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_sweep_task(entries, Duration::from_secs(3600), shutdown_rx)
            .expect("sweep task spawned");
        shutdown_tx.send_replace(true);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep task should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweep_task_not_spawned_for_unschedulable_interval() {
        let entries = shared_with(vec![("zero", Expiry::After(Duration::ZERO))]);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_sweep_task(
            entries.clone(),
            Duration::from_secs(u64::MAX / 2),
            shutdown_rx,
        );

        assert!(handle.is_none());
        assert_eq!(entries.read().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_task_exits_when_sender_dropped() {
        let entries = shared_with(vec![]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_sweep_task(entries, Duration::from_secs(3600), shutdown_rx)
            .expect("sweep task spawned");
        drop(shutdown_tx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep task should stop once its cache is gone")
            .unwrap();
    }

    #[test]
    fn test_sweep_once_skips_after_close() {
        let entries = shared_with(vec![("zero", Expiry::After(Duration::ZERO))]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        shutdown_tx.send_replace(true);

        assert_eq!(sweep_once(&entries, &shutdown_rx), None);
        assert_eq!(entries.read().len(), 1);
    }
}
