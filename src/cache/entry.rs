//! Cache Entry Module
//!
//! Defines the stored key/value pair and the reasons an entry can leave the cache.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;

// == Cache Entry ==
/// A single key/value pair owned by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Exact-match identity of the entry
    pub key: Bytes,
    /// The stored value
    pub value: Bytes,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }

    // == Size ==
    /// Bytes charged against the memory limit. Only the value is counted.
    pub fn size(&self) -> u64 {
        self.value.len() as u64
    }
}

// == Eviction Reason ==
/// Why an entry left the cache.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionReason {
    /// The entry-count limit was exceeded by an insert
    FullEntries,
    /// The byte-size limit could not hold an incoming value
    FullMemory,
    /// Explicit `remove` or `remove_oldest`
    ByUser,
    /// Bulk removal by `clear`
    Cleared,
}

impl EvictionReason {
    /// Stable kebab-case name, as used in logs and serialized stats.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionReason::FullEntries => "full-entries",
            EvictionReason::FullMemory => "full-memory",
            EvictionReason::ByUser => "by-user",
            EvictionReason::Cleared => "cleared",
        }
    }

    /// Returns true when the cache removed the entry on its own to satisfy a limit.
    pub fn is_automatic(&self) -> bool {
        matches!(self, EvictionReason::FullEntries | EvictionReason::FullMemory)
    }
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
