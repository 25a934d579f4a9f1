//! Cached Store Module
//!
//! Cache-aside reads and write-invalidate writes over a persistent store.

use std::path::Path;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::cache::{BoundedCache, Cache, CacheStats};
use crate::config::Options;
use crate::error::StoreResult;
use crate::store::{DirStore, PersistentStore};

// == Cached Store ==
/// A persistent store fronted by a [`BoundedCache`].
///
/// Reads check the cache first and fill it from the store on a miss.
/// Writes go to the store, then drop the key from the cache so the next read
/// reloads the committed value. A failed store call never touches the cache.
///
/// The store call and the cache update are each atomic but not atomic as a
/// pair. A reader that loaded a value just before a concurrent write may put
/// that older value back until it is evicted or written again.
#[derive(Debug)]
pub struct CachedStore<S> {
    store: S,
    cache: BoundedCache,
}

impl CachedStore<DirStore> {
    // == Open ==
    /// Opens a directory store at `dir` with a cache sized by `options`,
    /// or the default limits when `None`.
    pub fn open(dir: impl AsRef<Path>, options: Option<Options>) -> StoreResult<Self> {
        let store = DirStore::open(dir)?;
        Ok(Self::new(store, options.unwrap_or_default()))
    }
}

impl<S: PersistentStore> CachedStore<S> {
    // == Constructor ==
    pub fn new(store: S, options: Options) -> Self {
        let cache = BoundedCache::new(options.max_cache_item, options.max_cache_memory);
        Self::with_cache(store, cache)
    }

    /// Wraps `store` with a preconfigured cache, e.g. one carrying an eviction listener.
    pub fn with_cache(store: S, cache: BoundedCache) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &BoundedCache {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // == Get ==
    /// Returns the value for `key`, from the cache when possible.
    ///
    /// Store errors, including not-found, are returned unchanged.
    pub fn get(&self, key: &[u8]) -> StoreResult<Bytes> {
        if let Some(value) = self.cache.get(key) {
            debug!(key = %String::from_utf8_lossy(key), "cache hit");
            return Ok(value);
        }

        debug!(key = %String::from_utf8_lossy(key), "cache miss, reading store");
        let value = self.store.get(key)?;
        self.cache.add(Bytes::copy_from_slice(key), value.clone());
        Ok(value)
    }

    // == Put ==
    /// Writes to the store and invalidates the cached copy on success.
    pub fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        if let Err(err) = self.store.put(key, value) {
            warn!(key = %String::from_utf8_lossy(key), error = %err, "store write failed");
            return Err(err);
        }
        self.cache.remove(key);
        Ok(())
    }

    // == Close ==
    /// Closes the backing store. Cached entries are left to be dropped with `self`.
    pub fn close(&self) -> StoreResult<()> {
        self.store.close()
    }
}

impl<S: PersistentStore> PersistentStore for CachedStore<S> {
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        CachedStore::put(self, key, value)
    }

    fn get(&self, key: &[u8]) -> StoreResult<Bytes> {
        CachedStore::get(self, key)
    }

    fn close(&self) -> StoreResult<()> {
        CachedStore::close(self)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::cache::EvictionReason;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    /// Memory store that counts reads and can be told to fail writes.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
        fail_puts: AtomicBool,
    }

    impl CountingStore {
        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl PersistentStore for CountingStore {
        fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.put(key, value)
        }

        fn get(&self, key: &[u8]) -> StoreResult<Bytes> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn close(&self) -> StoreResult<()> {
            self.inner.close()
        }
    }

    /// Store that panics if the same key is read twice.
    #[derive(Default)]
    struct ReadOnceStore {
        inner: MemoryStore,
        seen: Mutex<Vec<Vec<u8>>>,
    }

    impl PersistentStore for ReadOnceStore {
        fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
            self.inner.put(key, value)
        }

        fn get(&self, key: &[u8]) -> StoreResult<Bytes> {
            let mut seen = self.seen.lock().unwrap();
            assert!(!seen.iter().any(|k| k == key), "key read from store twice");
            seen.push(key.to_vec());
            self.inner.get(key)
        }

        fn close(&self) -> StoreResult<()> {
            self.inner.close()
        }
    }

    fn small_options() -> Options {
        Options {
            max_cache_item: 4,
            max_cache_memory: 64,
        }
    }

    #[test]
    fn test_get_reads_through_once() {
        let backing = ReadOnceStore::default();
        backing.put(b"k", b"v").unwrap();
        let store = CachedStore::new(backing, small_options());

        assert_eq!(store.get(b"k").unwrap(), Bytes::from_static(b"v"));
        // Served from cache; a second store read would panic
        assert_eq!(store.get(b"k").unwrap(), Bytes::from_static(b"v"));
        assert_eq!(store.stats().hits, 1);
    }

    #[test]
    fn test_get_missing_key_propagates_and_leaves_cache() {
        let store = CachedStore::new(CountingStore::default(), small_options());

        let err = store.get(b"missing").unwrap_err();

        assert!(err.is_not_found());
        assert!(store.cache().is_empty());
    }

    #[test]
    fn test_put_invalidates_then_reloads_once() {
        let store = CachedStore::new(CountingStore::default(), small_options());
        store.put(b"k", b"v1").unwrap();
        store.get(b"k").unwrap();
        assert_eq!(store.store().reads(), 1);

        store.put(b"k", b"v2").unwrap();
        assert!(store.cache().get(b"k").is_none());

        assert_eq!(store.get(b"k").unwrap(), Bytes::from_static(b"v2"));
        assert_eq!(store.store().reads(), 2);
        assert_eq!(store.get(b"k").unwrap(), Bytes::from_static(b"v2"));
        assert_eq!(store.store().reads(), 2);
    }

    #[test]
    fn test_failed_put_leaves_cache_untouched() {
        let store = CachedStore::new(CountingStore::default(), small_options());
        store.put(b"k", b"old").unwrap();
        store.get(b"k").unwrap();

        store.store().fail_puts.store(true, Ordering::SeqCst);
        let err = store.put(b"k", b"new").unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.cache().get(b"k"), Some(Bytes::from_static(b"old")));
        assert_eq!(store.get(b"k").unwrap(), Bytes::from_static(b"old"));
        assert_eq!(store.store().reads(), 1);
    }

    #[test]
    fn test_oversized_value_bypasses_cache() {
        let store = CachedStore::new(CountingStore::default(), small_options());
        let big = vec![7u8; 65];
        store.put(b"big", &big).unwrap();

        assert_eq!(store.get(b"big").unwrap().len(), 65);
        assert_eq!(store.get(b"big").unwrap().len(), 65);

        assert!(store.cache().is_empty());
        assert_eq!(store.store().reads(), 2);
    }

    #[test]
    fn test_put_reports_invalidation_to_listener() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let cache = BoundedCache::new(4, 0)
            .with_eviction_listener(move |key, _, reason| sink.lock().unwrap().push((key, reason)));
        let store = CachedStore::with_cache(MemoryStore::new(), cache);

        store.put(b"k", b"v").unwrap();
        store.get(b"k").unwrap();
        store.put(b"k", b"v2").unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![(Bytes::from_static(b"k"), EvictionReason::ByUser)]
        );
    }

    #[test]
    fn test_close_closes_backing_store() {
        let store = CachedStore::new(MemoryStore::new(), Options::default());
        store.put(b"k", b"v").unwrap();
        store.get(b"k").unwrap();

        store.close().unwrap();

        assert!(matches!(store.put(b"k", b"v2"), Err(StoreError::Closed)));
        // Cached values are still served after close
        assert_eq!(store.get(b"k").unwrap(), Bytes::from_static(b"v"));
    }

    #[test]
    fn test_open_dir_store_with_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = CachedStore::open(tmp.path().join("db"), None).unwrap();

        store.put(b"test-key", b"test-value").unwrap();

        assert_eq!(store.get(b"test-key").unwrap(), Bytes::from_static(b"test-value"));
        assert_eq!(store.cache().max_entries(), 1000);
        assert_eq!(store.cache().max_memory(), 64 * 1024 * 1024);
        store.close().unwrap();
    }

    #[test]
    fn test_cached_store_as_persistent_store() {
        let store: Box<dyn PersistentStore> =
            Box::new(CachedStore::new(MemoryStore::new(), small_options()));

        store.put(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Bytes::from_static(b"v"));
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let store = Arc::new(CachedStore::new(MemoryStore::new(), small_options()));
        for i in 0..8u8 {
            store.put(&[i], &[i]).unwrap();
        }

        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..200u8 {
                        let key = [i % 8];
                        if (i + t) % 5 == 0 {
                            store.put(&key, &key).unwrap();
                        } else {
                            assert_eq!(store.get(&key).unwrap().as_ref(), &key);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(store.cache().len() <= 4);
    }
}
