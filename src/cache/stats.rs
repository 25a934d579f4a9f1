//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and removals.

use serde::Serialize;

use crate::cache::EvictionReason;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache lookups
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Entries removed by the cache itself to honor a limit
    pub evictions: u64,
    /// Entries removed through `remove`, `remove_oldest` or `clear`
    pub removals: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current sum of value sizes in bytes
    pub memory_used: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Removal ==
    /// Counts one departed entry under the bucket its reason belongs to.
    pub fn record_removal(&mut self, reason: EvictionReason) {
        if reason.is_automatic() {
            self.evictions += 1;
        } else {
            self.removals += 1;
        }
    }
}
