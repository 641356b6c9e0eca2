//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a plain HashMap model.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cache::{Cache, Expiry, HashCache, PartitionedCache};

// == Strategies ==
/// Generates cache keys shaped like request paths
fn key_strategy() -> impl Strategy<Value = String> {
    "/[a-zA-Z0-9_]{1,16}".prop_map(|s| s)
}

/// Generates raw byte values
fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// Applies `ops` to `cache` and to a HashMap model, checking every read.
fn check_against_model(
    cache: &dyn Cache<Vec<u8>>,
    ops: Vec<CacheOp>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, Vec<u8>> = HashMap::new();

    for op in ops {
        match op {
            CacheOp::Set { key, value } => {
                cache.set_indefinite(&key, value.clone());
                model.insert(key, value);
            }
            CacheOp::Get { key } => {
                prop_assert_eq!(cache.get(&key), model.get(&key).cloned());
            }
            CacheOp::Delete { key } => {
                cache.delete(&key);
                model.remove(&key);
            }
        }
        prop_assert_eq!(cache.len(), model.len());
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any sequence of indefinite sets, gets and deletes behaves like a map.
    #[test]
    fn prop_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..64)) {
        let cache: HashCache<Vec<u8>> = HashCache::without_sweep();
        check_against_model(&cache, ops)?;
    }

    // Partitioning is invisible to callers.
    #[test]
    fn prop_partitioned_matches_map_model(
        partitions in 1usize..16,
        ops in prop::collection::vec(cache_op_strategy(), 1..64)
    ) {
        let cache: PartitionedCache<Vec<u8>> = PartitionedCache::new(partitions, Duration::ZERO);
        check_against_model(&cache, ops)?;
    }

    // Never-written keys are not found.
    #[test]
    fn prop_unwritten_key_not_found(
        written in prop::collection::hash_set(key_strategy(), 0..32),
        probe in key_strategy()
    ) {
        prop_assume!(!written.contains(&probe));

        let cache = HashCache::without_sweep();
        for key in &written {
            cache.set_indefinite(key.clone(), 1u8);
        }

        prop_assert_eq!(cache.get(&probe), None);
    }

    // Len equals the number of distinct keys written.
    #[test]
    fn prop_len_counts_distinct_keys(keys in prop::collection::vec(key_strategy(), 0..64)) {
        let cache = HashCache::without_sweep();
        for key in &keys {
            cache.set(key.clone(), key.len(), Duration::from_secs(3600));
        }

        let distinct: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(cache.len(), distinct.len());
    }

    // Delete always wins over an earlier write, whatever its expiry.
    #[test]
    fn prop_delete_removes_entry(
        key in key_strategy(),
        value in value_strategy(),
        ttl_secs in proptest::option::of(1u64..3600)
    ) {
        let cache = HashCache::without_sweep();
        let expiry = ttl_secs.map_or(Expiry::Never, |secs| Expiry::After(Duration::from_secs(secs)));

        cache.set(key.clone(), value.clone(), expiry);
        prop_assert_eq!(cache.get(&key), Some(value));

        cache.delete(&key);
        prop_assert_eq!(cache.get(&key), None);

        // Deleting again is a no-op
        cache.delete(&key);
        prop_assert!(cache.is_empty());
    }

    // Key routing is stable and in range.
    #[test]
    fn prop_partition_routing_stable(partitions in 1usize..64, key in key_strategy()) {
        let cache: PartitionedCache<u8> = PartitionedCache::new(partitions, Duration::ZERO);

        let index = cache.partition_for(&key);
        prop_assert!(index < partitions);
        prop_assert_eq!(cache.partition_for(&key), index);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Concurrent writers store (tag, tag-repeated) pairs; a reader must only
    // ever observe a value whose bytes all equal its tag.
    #[test]
    fn prop_concurrent_operation_correctness(
        keys in prop::collection::vec(key_strategy(), 1..8),
        lengths in prop::collection::vec(1usize..256, 4)
    ) {
        let cache = Arc::new(HashCache::<(u8, Vec<u8>)>::without_sweep());
        let keys = Arc::new(keys);

        let writers: Vec<_> = lengths
            .into_iter()
            .enumerate()
            .map(|(tag, len)| {
                let cache = Arc::clone(&cache);
                let keys = Arc::clone(&keys);
                thread::spawn(move || {
                    let tag = tag as u8;
                    for round in 0..200 {
                        let key = &keys[round % keys.len()];
                        if round % 7 == 0 {
                            cache.delete(key);
                        } else {
                            cache.set(key.clone(), (tag, vec![tag; len]), Duration::from_secs(60));
                        }
                    }
                })
            })
            .collect();

        let reader = {
            let cache = Arc::clone(&cache);
            let keys = Arc::clone(&keys);
            thread::spawn(move || {
                let mut torn = 0usize;
                for round in 0..1000 {
                    if let Some((tag, bytes)) = cache.get(&keys[round % keys.len()]) {
                        if bytes.iter().any(|b| *b != tag) {
                            torn += 1;
                        }
                    }
                }
                torn
            })
        };

        for writer in writers {
            prop_assert!(writer.join().is_ok(), "writer panicked");
        }
        let torn = reader.join().unwrap_or(usize::MAX);
        prop_assert_eq!(torn, 0, "reader observed a partially written entry");
        prop_assert!(cache.len() <= keys.len());
    }
}
