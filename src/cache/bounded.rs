//! Bounded Cache Module
//!
//! Thread-safe LRU cache enforcing an entry-count limit and a value-byte limit.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

use crate::cache::{Cache, CacheEntry, CacheStats, EvictionReason, LruList};

/// Callback invoked once for every entry that leaves the cache.
pub type EvictionListener = Box<dyn Fn(Bytes, Bytes, EvictionReason) + Send + Sync>;

// == Inner State ==
/// Everything guarded by the cache lock.
#[derive(Debug, Default)]
struct Inner {
    /// Key lookup into `order`
    index: HashMap<Bytes, usize>,
    /// Entries ordered by recency
    order: LruList,
    /// Sum of value sizes of all entries
    memory_used: u64,
    stats: CacheStats,
}

impl Inner {
    fn size_of(&self, key: &[u8]) -> u64 {
        self.index
            .get(key)
            .and_then(|&idx| self.order.get(idx))
            .map_or(0, CacheEntry::size)
    }

    fn pop_oldest(&mut self, reason: EvictionReason) -> Option<CacheEntry> {
        let entry = self.order.pop_back()?;
        self.forget(&entry, reason);
        Some(entry)
    }

    fn remove_key(&mut self, key: &[u8], reason: EvictionReason) -> Option<CacheEntry> {
        let idx = self.index.get(key).copied()?;
        let entry = self.order.remove(idx)?;
        self.forget(&entry, reason);
        Some(entry)
    }

    fn forget(&mut self, entry: &CacheEntry, reason: EvictionReason) {
        self.index.remove(&entry.key);
        self.memory_used -= entry.size();
        self.stats.record_removal(reason);
    }
}

// == Bounded Cache ==
/// In-memory LRU cache with two independent capacity limits.
///
/// Every mutation, including `get` (which refreshes recency), takes the
/// exclusive lock. Only `len` and `stats` share it.
///
/// Evicted entries are collected under the lock and reported to the
/// listener after the lock is released, before the call returns.
pub struct BoundedCache {
    max_entries: usize,
    max_memory: u64,
    inner: RwLock<Inner>,
    listener: Option<EvictionListener>,
}

impl BoundedCache {
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` entries whose values
    /// sum to at most `max_memory` bytes. Zero means unbounded.
    pub fn new(max_entries: u64, max_memory: u64) -> Self {
        let max_entries = match max_entries {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };
        let max_memory = match max_memory {
            0 => u64::MAX,
            n => n,
        };

        Self {
            max_entries,
            max_memory,
            inner: RwLock::new(Inner::default()),
            listener: None,
        }
    }

    // == Eviction Listener ==
    /// Registers a callback receiving `(key, value, reason)` for every removal.
    ///
    /// The callback runs on the thread that triggered the removal.
    pub fn with_eviction_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(Bytes, Bytes, EvictionReason) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn max_memory(&self) -> u64 {
        self.max_memory
    }

    /// Current sum of value sizes in bytes.
    pub fn memory_used(&self) -> u64 {
        self.inner.read().memory_used
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.order.len();
        stats.memory_used = inner.memory_used;
        stats
    }

    /// Returns the keys from most to least recently used.
    pub fn keys(&self) -> Vec<Bytes> {
        self.inner
            .read()
            .order
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    fn notify(&self, removed: Vec<(CacheEntry, EvictionReason)>) {
        for (entry, reason) in removed {
            debug!(
                key = %String::from_utf8_lossy(&entry.key),
                size = entry.size(),
                %reason,
                "cache entry removed"
            );
            if let Some(listener) = &self.listener {
                listener(entry.key, entry.value, reason);
            }
        }
    }
}

impl Cache for BoundedCache {
    // == Add ==
    /// Inserts or replaces `key`, evicting from the back to stay within limits.
    ///
    /// A value larger than the memory limit is silently dropped.
    fn add(&self, key: Bytes, value: Bytes) {
        let size = value.len() as u64;
        if size > self.max_memory {
            debug!(size, max_memory = self.max_memory, "value exceeds cache memory limit, not cached");
            return;
        }

        let mut removed = Vec::new();
        {
            let mut guard = self.inner.write();
            let inner = &mut *guard;

            // Replacing a key only charges the difference in size
            let mut fits = true;
            while inner.memory_used - inner.size_of(&key) + size > self.max_memory {
                match inner.pop_oldest(EvictionReason::FullMemory) {
                    Some(entry) => removed.push((entry, EvictionReason::FullMemory)),
                    None => {
                        fits = false;
                        break;
                    }
                }
            }

            if fits {
                match inner.index.get(&key).copied() {
                    Some(idx) => {
                        if let Some(entry) = inner.order.get_mut(idx) {
                            let old = entry.size();
                            entry.value = value;
                            inner.memory_used = inner.memory_used - old + size;
                        }
                        inner.order.move_to_front(idx);
                    }
                    None => {
                        let idx = inner.order.push_front(CacheEntry::new(key.clone(), value));
                        inner.index.insert(key, idx);
                        inner.memory_used += size;

                        if inner.order.len() > self.max_entries {
                            if let Some(entry) = inner.pop_oldest(EvictionReason::FullEntries) {
                                removed.push((entry, EvictionReason::FullEntries));
                            }
                        }
                    }
                }
            }
        }

        self.notify(removed);
    }

    // == Get ==
    /// Looks up `key` and marks it most recently used on a hit.
    fn get(&self, key: &[u8]) -> Option<Bytes> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        match inner.index.get(key).copied() {
            Some(idx) => {
                inner.order.move_to_front(idx);
                inner.stats.record_hit();
                inner.order.get(idx).map(|entry| entry.value.clone())
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    fn remove(&self, key: &[u8]) {
        let removed = self.inner.write().remove_key(key, EvictionReason::ByUser);
        if let Some(entry) = removed {
            self.notify(vec![(entry, EvictionReason::ByUser)]);
        }
    }

    // == Remove Oldest ==
    fn remove_oldest(&self) {
        let removed = self.inner.write().pop_oldest(EvictionReason::ByUser);
        if let Some(entry) = removed {
            self.notify(vec![(entry, EvictionReason::ByUser)]);
        }
    }

    fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    // == Clear ==
    /// Removes every entry, oldest first, and leaves the cache empty and usable.
    fn clear(&self) {
        self.purge();
    }
}

impl BoundedCache {
    // == Purge ==
    /// Clears the cache like [`Cache::clear`] and returns how many entries
    /// were dropped, counted under the same lock that dropped them.
    pub fn purge(&self) -> usize {
        let drained = {
            let mut guard = self.inner.write();
            let inner = &mut *guard;
            let drained = inner.order.drain();
            inner.index.clear();
            inner.memory_used = 0;
            for _ in &drained {
                inner.stats.record_removal(EvictionReason::Cleared);
            }
            drained
        };

        let removed = drained.len();
        self.notify(
            drained
                .into_iter()
                .map(|entry| (entry, EvictionReason::Cleared))
                .collect(),
        );
        removed
    }
}

impl fmt::Debug for BoundedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("max_entries", &self.max_entries)
            .field("max_memory", &self.max_memory)
            .field("len", &self.len())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
