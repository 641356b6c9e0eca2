//! Partitioned Cache Module
//!
//! Spreads keys over independent [`HashCache`] instances to reduce lock
//! contention. Partitions share nothing; a key always maps to the same one.

use std::time::Duration;

use tracing::debug;

use crate::cache::{Cache, Expiry, HashCache};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a hash.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

// == Partitioned Cache ==
/// A fixed set of independent caches, selected by key hash.
pub struct PartitionedCache<V> {
    partitions: Vec<HashCache<V>>,
}

impl<V> PartitionedCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates `partitions` caches (at least one), each with its own sweep.
    ///
    /// # Panics
    /// Panics if a sweep is requested outside of a Tokio runtime.
    pub fn new(partitions: usize, sweep_interval: Duration) -> Self {
        let count = partitions.max(1);
        debug!(partitions = count, "Creating partitioned cache");

        Self {
            partitions: (0..count).map(|_| HashCache::new(sweep_interval)).collect(),
        }
    }
}

impl<V> PartitionedCache<V> {
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Index of the partition responsible for `key`.
    pub fn partition_for(&self, key: &str) -> usize {
        fnv1a_32(key.as_bytes()) as usize % self.partitions.len()
    }

    fn partition(&self, key: &str) -> &HashCache<V> {
        &self.partitions[self.partition_for(key)]
    }

    /// Closes every partition and waits for their sweep tasks to exit.
    pub async fn shutdown(&self) {
        for partition in &self.partitions {
            partition.shutdown().await;
        }
    }
}

impl<V> Cache<V> for PartitionedCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn set(&self, key: &str, value: V, expiry: Expiry) {
        self.partition(key).set(key, value, expiry);
    }

    fn get(&self, key: &str) -> Option<V> {
        self.partition(key).get(key)
    }

    fn delete(&self, key: &str) {
        self.partition(key).delete(key);
    }

    fn len(&self) -> usize {
        self.partitions.iter().map(HashCache::len).sum()
    }

    fn close(&self) {
        for partition in &self.partitions {
            if !partition.is_closed() {
                partition.close();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_zero_partitions_clamped() {
        let cache: PartitionedCache<u8> = PartitionedCache::new(0, Duration::ZERO);
        assert_eq!(cache.partition_count(), 1);
        assert_eq!(cache.partition_for("/anything"), 0);
    }

    #[test]
    fn test_keys_routed_to_single_partition() {
        let cache = PartitionedCache::new(10, Duration::ZERO);

        for i in 0..100 {
            Cache::set(&cache, &format!("/key{i}"), i, Expiry::Never);
        }

        assert_eq!(Cache::len(&cache), 100);
        for i in 0..100 {
            let key = format!("/key{i}");
            let owner = cache.partition_for(&key);
            for (index, partition) in cache.partitions.iter().enumerate() {
                assert_eq!(partition.get(&key).is_some(), index == owner);
            }
            assert_eq!(Cache::get(&cache, &key), Some(i));
        }
    }

    #[test]
    fn test_delete_and_overwrite() {
        let cache = PartitionedCache::new(4, Duration::ZERO);

        cache.set_indefinite("/a", "one");
        cache.set_indefinite("/a", "two");
        assert_eq!(cache.get("/a"), Some("two"));
        assert_eq!(cache.len(), 1);

        cache.delete("/a");
        cache.delete("/missing");
        assert_eq!(cache.get("/a"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_close_closes_every_partition() {
        let cache: PartitionedCache<u8> = PartitionedCache::new(3, Duration::from_millis(10));

        Cache::close(&cache);
        Cache::close(&cache);

        assert!(cache.partitions.iter().all(HashCache::is_closed));
        cache.shutdown().await;
    }
}
