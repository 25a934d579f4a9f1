//! Cached KV - a bounded LRU cache in front of a persistent key-value store
//!
//! Reads are served from memory when possible and filled from the store on a
//! miss. Writes go to the store first and invalidate the cached copy.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::AppState;
pub use cache::{BoundedCache, Cache, EvictionReason};
pub use config::{Config, Options};
pub use error::StoreError;
pub use store::{CachedStore, DirStore, MemoryStore, PersistentStore};
