//! API Handlers
//!
//! HTTP request handlers for each endpoint of the cached store service.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::config::{Config, Options};
use crate::error::{ApiError, Result, StoreResult};
use crate::models::{
    ClearResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::store::{CachedStore, PersistentStore};

/// The backing store type served over HTTP.
pub type SharedStore = CachedStore<Box<dyn PersistentStore>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached store; synchronizes internally
    pub store: Arc<SharedStore>,
}

impl AppState {
    /// Creates a new AppState around an already built cached store.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wraps any persistent store with a cache sized by `options`.
    pub fn with_store<S: PersistentStore + 'static>(store: S, options: Options) -> Self {
        Self::new(CachedStore::new(Box::new(store), options))
    }

    /// Opens the directory store named by the configuration.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let store = crate::store::DirStore::open(&config.data_dir)?;
        Ok(Self::with_store(store, config.options()))
    }
}

/// Runs a store call on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> StoreResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(ApiError::from)
}

/// Handler for PUT /set
///
/// Writes a key-value pair through to the persistent store.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let store = state.store.clone();
    let SetRequest { key, value } = req;
    let written = key.clone();
    run_blocking(move || store.put(key.as_bytes(), value.as_bytes())).await?;

    Ok(Json(SetResponse::new(written)))
}

/// Handler for GET /get/:key
///
/// Reads a value, from the cache when possible.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let store = state.store.clone();
    let lookup = key.clone();
    let value = run_blocking(move || store.get(lookup.as_bytes())).await?;
    let value = String::from_utf8(value.to_vec())
        .map_err(|err| ApiError::Internal(format!("value for '{}' is not valid UTF-8: {}", key, err)))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.store.stats()))
}

/// Handler for DELETE /cache
///
/// Drops every cached entry. The persistent store is not touched.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.store.cache().purge();
    info!(removed, "cache cleared on request");

    Json(ClearResponse::new(removed))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
