//! Cache Module
//!
//! Provides a bounded, thread-safe LRU cache limited by entry count and value bytes.

mod bounded;
mod entry;
mod lru;
mod stats;


use bytes::Bytes;

// Re-export public types
pub use bounded::{BoundedCache, EvictionListener};
pub use entry::{CacheEntry, EvictionReason};
pub use lru::LruList;
pub use stats::CacheStats;

// == Cache Trait ==
/// Operations every cache implementation exposes.
///
/// All methods take `&self`; implementations synchronize internally.
pub trait Cache: Send + Sync {
    /// Inserts or replaces a value. Values that can never fit are dropped silently.
    fn add(&self, key: Bytes, value: Bytes);

    /// Returns the cached value and refreshes its recency.
    fn get(&self, key: &[u8]) -> Option<Bytes>;

    /// Removes `key` if present.
    fn remove(&self, key: &[u8]);

    /// Removes the least recently used entry if any.
    fn remove_oldest(&self);

    /// Number of cached entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    fn clear(&self);
}
