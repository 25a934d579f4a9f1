//! Configuration Module
//!
//! Handles cache options and loading server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default entry-count limit of the cache.
pub const DEFAULT_MAX_CACHE_ITEM: u64 = 1000;

/// Default byte limit of cached values (64 MiB).
pub const DEFAULT_MAX_CACHE_MEMORY: u64 = 64 * 1024 * 1024;

// == Options ==
/// Cache limits consumed by [`CachedStore`](crate::store::CachedStore).
///
/// A zero in either field means that dimension is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Maximum number of cached entries
    pub max_cache_item: u64,
    /// Maximum sum of cached value sizes in bytes
    pub max_cache_memory: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_cache_item: DEFAULT_MAX_CACHE_ITEM,
            max_cache_memory: DEFAULT_MAX_CACHE_MEMORY,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_cache_items: u64,
    /// Maximum total size of cached values in bytes
    pub max_cache_memory: u64,
    /// Directory holding the persistent store
    pub data_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_CACHE_ITEMS` - Maximum cache entries (default: 1000)
    /// - `MAX_CACHE_MEMORY` - Maximum cached bytes (default: 67108864)
    /// - `DATA_DIR` - Store directory (default: ./data)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_cache_items: env::var("MAX_CACHE_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_cache_items),
            max_cache_memory: env::var("MAX_CACHE_MEMORY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_cache_memory),
            data_dir: env::var_os("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Cache limits derived from this configuration.
    pub fn options(&self) -> Options {
        Options {
            max_cache_item: self.max_cache_items,
            max_cache_memory: self.max_cache_memory,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let options = Options::default();
        Self {
            max_cache_items: options.max_cache_item,
            max_cache_memory: options.max_cache_memory,
            data_dir: PathBuf::from("./data"),
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = Options::default();
        assert_eq!(options.max_cache_item, 1000);
        assert_eq!(options.max_cache_memory, 64 * 1024 * 1024);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_cache_items, 1000);
        assert_eq!(config.max_cache_memory, 67_108_864);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_options() {
        let config = Config {
            max_cache_items: 5,
            max_cache_memory: 10,
            ..Config::default()
        };
        assert_eq!(
            config.options(),
            Options {
                max_cache_item: 5,
                max_cache_memory: 10
            }
        );
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MAX_CACHE_ITEMS");
        env::remove_var("MAX_CACHE_MEMORY");
        env::remove_var("DATA_DIR");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.max_cache_items, 1000);
        assert_eq!(config.max_cache_memory, 67_108_864);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.server_port, 3000);
    }
}
