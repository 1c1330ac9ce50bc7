//! Durable key-value cache with timestamped entries.
//!
//! A [`CacheStore`] is the dumb persistence medium (string keys, string
//! values, no TTL). [`DurableCache`] layers an in-memory map, JSON encoding
//! and TTL checks on top of it.

mod durable;
mod memory;
mod sqlite;

pub use durable::{CacheEntry, DurableCache};
pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::CacheConfig;

/// Errors for cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(String),

    /// Stored payload could not be decoded.
    #[error("Corrupt cache entry: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Persistence medium for cache entries.
pub trait CacheStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_raw(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Source of the current time, injectable for TTL tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Open the store selected by `config`: SQLite when a path is set, memory otherwise.
pub fn open_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match &config.path {
        Some(path) => {
            info!("Opening cache database at {:?}", path);
            Ok(Arc::new(SqliteCacheStore::new(path)?))
        }
        None => {
            warn!("No cache path configured, cached data will not survive a restart");
            Ok(Arc::new(MemoryCacheStore::new()))
        }
    }
}
