//! Store Module
//!
//! Persistent key-value stores and the cache-accelerated wrapper around them.

mod cached;
mod dir;
mod memory;

use std::sync::Arc;

use bytes::Bytes;

use crate::error::StoreResult;

pub use cached::CachedStore;
pub use dir::DirStore;
pub use memory::MemoryStore;

// == Persistent Store Trait ==
/// A durable key-value store sitting behind the cache.
///
/// A missing key is reported as [`StoreError::NotFound`](crate::error::StoreError::NotFound).
/// Implementations handle their own synchronization.
pub trait PersistentStore: Send + Sync {
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    fn get(&self, key: &[u8]) -> StoreResult<Bytes>;

    /// Releases the store. Later calls fail with `StoreError::Closed`.
    fn close(&self) -> StoreResult<()>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for Box<S> {
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> StoreResult<Bytes> {
        (**self).get(key)
    }

    fn close(&self) -> StoreResult<()> {
        (**self).close()
    }
}

impl<S: PersistentStore + ?Sized> PersistentStore for Arc<S> {
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> StoreResult<Bytes> {
        (**self).get(key)
    }

    fn close(&self) -> StoreResult<()> {
        (**self).close()
    }
}
