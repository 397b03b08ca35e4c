//! Sharded in-memory cache with per-entry expiration and bounded LRU shards.
//!
//! The cache is split into a fixed number of independently locked shards.
//! Each shard owns a hash map and a recency list; capacity overflow evicts
//! the least recently used entry of that shard. Expiration is checked lazily
//! on read and eagerly by a single background sweeper task that walks every
//! shard on a fixed interval.
//!
//! The cache is generic over its value type, so callers get typed reads
//! without any downcasting at call sites.

mod cache;
mod entry;
mod shard;

pub use cache::{CacheConfig, ShardedCache};
pub use entry::CacheEntry;
