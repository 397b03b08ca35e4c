use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::shard::Shard;

/// Configuration for a [`ShardedCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Total capacity across all shards.
    pub total_capacity: usize,
    /// Number of independently locked shards.
    pub num_shards: usize,
    /// TTL applied by [`ShardedCache::set`]. Zero means entries never expire.
    pub default_ttl: Duration,
    /// Interval between background expiration sweeps. Zero disables the
    /// sweeper; expiration is then lazy only.
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            total_capacity: 5000,
            num_shards: 16,
            default_ttl: Duration::from_secs(600),
            cleanup_interval: Duration::from_secs(300),
        }
    }
}

/// A sharded, expiring, bounded LRU cache.
///
/// Keys route deterministically to one of `num_shards` shards; operations on
/// distinct shards proceed in parallel, operations on one shard are
/// serialized by its lock. Capacity overflow evicts exactly one entry per
/// insert, the least recently used of the target shard.
///
/// Construction must happen inside a tokio runtime when a sweeper is
/// configured, since the sweeper runs as a background task.
pub struct ShardedCache<T> {
    shards: Arc<Vec<Shard<T>>>,
    default_ttl: Duration,
    cancel: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Clone + Send + Sync + 'static> ShardedCache<T> {
    pub fn new(config: CacheConfig) -> Self {
        let num_shards = config.num_shards.max(1);
        let shard_capacity = (config.total_capacity / num_shards).max(1);
        let shards: Arc<Vec<Shard<T>>> =
            Arc::new((0..num_shards).map(|_| Shard::new(shard_capacity)).collect());

        let cancel = CancellationToken::new();
        let sweeper = if config.cleanup_interval > Duration::ZERO {
            Some(spawn_sweeper(
                Arc::clone(&shards),
                config.cleanup_interval,
                cancel.clone(),
            ))
        } else {
            None
        };

        Self {
            shards,
            default_ttl: config.default_ttl,
            cancel,
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Look up `key`. A hit promotes the entry to most recently used; an
    /// expired entry is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<T> {
        self.shard(key).get(key, Instant::now())
    }

    /// Insert or replace `key` with the default TTL.
    pub fn set(&self, key: String, value: T) {
        self.set_with_ttl(key, value, Duration::ZERO);
    }

    /// Insert or replace `key` with a specific TTL.
    ///
    /// A zero `ttl` falls back to the default TTL; if that is also zero the
    /// entry never expires.
    pub fn set_with_ttl(&self, key: String, value: T, ttl: Duration) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(Instant::now() + ttl)
        };
        self.shard(&key).insert(key, value, expires_at);
    }

    /// Remove `key` if present.
    pub fn delete(&self, key: &str) -> bool {
        self.shard(key).remove(key)
    }

    /// Remove every entry from every shard.
    pub fn flush(&self) {
        for shard in self.shards.iter() {
            shard.clear();
        }
    }

    /// Total number of live entries across all shards.
    pub fn count(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    /// Remove all expired entries immediately, returning the number removed.
    pub fn delete_expired(&self) -> usize {
        let now = Instant::now();
        self.shards.iter().map(|s| s.remove_expired(now)).sum()
    }

    /// Stop the background sweeper and wait for it to exit.
    ///
    /// Safe to call more than once, and safe when no sweeper was started.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.sweeper.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn shard(&self, key: &str) -> &Shard<T> {
        &self.shards[shard_index(key, self.shards.len())]
    }
}

impl<T> Drop for ShardedCache<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Polynomial string hash, `h = 31*h + byte`, sign-corrected.
///
/// The hash only has to be deterministic for the process lifetime and
/// uniformly spread over shards, so wrapping arithmetic is fine.
fn shard_index(key: &str, num_shards: usize) -> usize {
    let mut h: i64 = 0;
    for &b in key.as_bytes() {
        h = h.wrapping_mul(31).wrapping_add(i64::from(b));
    }
    (h.unsigned_abs() as usize) % num_shards
}

fn spawn_sweeper<T: Clone + Send + Sync + 'static>(
    shards: Arc<Vec<Shard<T>>>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so the initial sweep
        // happens one full interval after construction.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("cache sweeper stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let removed: usize =
                        shards.iter().map(|s| s.remove_expired(now)).sum();
                    if removed > 0 {
                        trace!(removed, "cache sweep removed expired entries");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::shard_index;

    #[test]
    fn shard_index_is_deterministic_and_in_range() {
        for key in ["A:5", "B:10", "", "Z:100", "letter:1"] {
            let first = shard_index(key, 16);
            assert_eq!(first, shard_index(key, 16));
            assert!(first < 16);
        }
    }
}
