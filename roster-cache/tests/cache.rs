//! Behavioral tests for the sharded LRU cache.

use std::time::Duration;

use roster_cache::{CacheConfig, ShardedCache};

fn config(capacity: usize, shards: usize) -> CacheConfig {
    CacheConfig {
        total_capacity: capacity,
        num_shards: shards,
        default_ttl: Duration::ZERO,
        cleanup_interval: Duration::ZERO,
    }
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let cache: ShardedCache<String> = ShardedCache::new(config(100, 4));
    cache.set("hello".into(), "world".into());

    assert_eq!(cache.get("hello"), Some("world".into()));
    assert_eq!(cache.get("missing"), None);
}

#[tokio::test]
async fn set_replaces_existing_value() {
    let cache: ShardedCache<u32> = ShardedCache::new(config(100, 4));
    cache.set("k".into(), 1);
    cache.set("k".into(), 2);

    assert_eq!(cache.get("k"), Some(2));
    assert_eq!(cache.count(), 1);
}

#[tokio::test]
async fn overfilling_one_shard_retains_most_recent_keys() {
    // A single shard makes the retained set fully deterministic.
    let cache: ShardedCache<usize> = ShardedCache::new(config(5, 1));
    for i in 0..20 {
        cache.set(format!("key-{i}"), i);
    }

    assert_eq!(cache.count(), 5);
    for i in 15..20 {
        assert_eq!(cache.get(&format!("key-{i}")), Some(i));
    }
    for i in 0..15 {
        assert_eq!(cache.get(&format!("key-{i}")), None);
    }
}

#[tokio::test]
async fn recently_read_key_survives_eviction() {
    let cache: ShardedCache<usize> = ShardedCache::new(config(3, 1));
    cache.set("a".into(), 0);
    cache.set("b".into(), 1);
    cache.set("c".into(), 2);

    // "a" is the LRU candidate until we read it.
    assert_eq!(cache.get("a"), Some(0));
    cache.set("d".into(), 3);

    assert_eq!(cache.get("a"), Some(0));
    assert_eq!(cache.get("b"), None);
}

#[tokio::test]
async fn expired_entries_are_never_returned() {
    let cache: ShardedCache<u8> = ShardedCache::new(config(10, 2));
    cache.set_with_ttl("short".into(), 1, Duration::from_millis(20));
    cache.set("forever".into(), 2);

    assert_eq!(cache.get("short"), Some(1));
    tokio::time::sleep(Duration::from_millis(40)).await;

    assert_eq!(cache.get("short"), None);
    assert_eq!(cache.get("forever"), Some(2));
}

#[tokio::test]
async fn count_sums_over_all_shards() {
    let cache: ShardedCache<usize> = ShardedCache::new(config(1000, 8));
    for i in 0..100 {
        cache.set(format!("key-{i}"), i);
    }
    assert_eq!(cache.count(), 100);

    cache.delete("key-0");
    assert_eq!(cache.count(), 99);

    cache.flush();
    assert_eq!(cache.count(), 0);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let cache: ShardedCache<u8> = ShardedCache::new(config(10, 2));
    cache.set("k".into(), 1);

    assert!(cache.delete("k"));
    assert!(!cache.delete("k"));
    assert_eq!(cache.get("k"), None);
}

#[tokio::test]
async fn sweeper_reclaims_expired_entries_without_reads() {
    let cache: ShardedCache<u8> = ShardedCache::new(CacheConfig {
        total_capacity: 100,
        num_shards: 4,
        default_ttl: Duration::from_millis(20),
        cleanup_interval: Duration::from_millis(25),
    });
    for i in 0..10 {
        cache.set(format!("key-{i}"), i);
    }
    assert_eq!(cache.count(), 10);

    // Entries expire and the sweep runs without any get() touching them.
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(cache.count(), 0);

    cache.shutdown().await;
}

#[tokio::test]
async fn delete_expired_reports_removed_count() {
    let cache: ShardedCache<u8> = ShardedCache::new(config(100, 4));
    cache.set_with_ttl("a".into(), 1, Duration::from_millis(10));
    cache.set_with_ttl("b".into(), 2, Duration::from_millis(10));
    cache.set("c".into(), 3);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(cache.delete_expired(), 2);
    assert_eq!(cache.count(), 1);
}

#[tokio::test]
async fn shutdown_is_idempotent_with_and_without_sweeper() {
    // cleanup_interval = 0 never starts a sweeper; shutdown must still be safe.
    let lazy: ShardedCache<u8> = ShardedCache::new(config(10, 2));
    lazy.shutdown().await;
    lazy.shutdown().await;

    let swept: ShardedCache<u8> = ShardedCache::new(CacheConfig {
        total_capacity: 10,
        num_shards: 2,
        default_ttl: Duration::from_secs(1),
        cleanup_interval: Duration::from_millis(10),
    });
    swept.shutdown().await;
    swept.shutdown().await;
}

#[tokio::test]
async fn distinct_keys_under_concurrency_stay_consistent() {
    let cache: std::sync::Arc<ShardedCache<usize>> =
        std::sync::Arc::new(ShardedCache::new(config(1024, 16)));

    let mut handles = Vec::new();
    for t in 0..8 {
        let cache = std::sync::Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            for i in 0..100 {
                let key = format!("t{t}-{i}");
                cache.set(key.clone(), t * 1000 + i);
                assert_eq!(cache.get(&key), Some(t * 1000 + i));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(cache.count(), 800);
}
