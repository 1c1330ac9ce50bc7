//! TTL cache over a [`CacheStore`] with an in-memory fast path.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{CacheError, CacheStore, Clock};
use crate::metrics::CACHE_LOOKUPS;

/// A decoded cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: T,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
}

/// Serialized form: `{"ts": <unix millis>, "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    ts: i64,
    data: Value,
}

/// Namespaced TTL cache.
///
/// Reads go to the memory layer first and fall back to the store; a store
/// hit populates the memory layer. Entries are never updated in place: an
/// expired entry reads as absent until the owner writes a fresh one.
pub struct DurableCache {
    store: Arc<dyn CacheStore>,
    namespace: String,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    memory: RwLock<HashMap<String, StoredEntry>>,
}

impl DurableCache {
    pub fn new(
        store: Arc<dyn CacheStore>,
        namespace: impl Into<String>,
        ttl: TimeDelta,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            ttl,
            clock,
            memory: RwLock::new(HashMap::new()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn is_fresh(&self, entry: &StoredEntry, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - entry.ts < self.ttl.num_milliseconds()
    }

    fn record(&self, result: &str) {
        CACHE_LOOKUPS
            .with_label_values(&[self.namespace.as_str(), result])
            .inc();
    }

    /// Look up a fresh entry. Never fails: corrupt or unreadable data is
    /// reported as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let now = self.clock.now();

        let cached = self
            .memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        if let Some(entry) = cached {
            if self.is_fresh(&entry, now) {
                if let Some(decoded) = decode(key, entry) {
                    self.record("memory_hit");
                    return Some(decoded);
                }
            }
            self.memory
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(key);
        }

        let raw = match self.store.get_raw(&self.storage_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.record("miss");
                return None;
            }
            Err(e) => {
                warn!(namespace = %self.namespace, key = %key, error = %e, "Cache read failed");
                self.record("miss");
                return None;
            }
        };

        let entry: StoredEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                let err = CacheError::Parse(e.to_string());
                debug!(namespace = %self.namespace, key = %key, error = %err, "Ignoring cache entry");
                self.record("corrupt");
                return None;
            }
        };

        if !self.is_fresh(&entry, now) {
            debug!(namespace = %self.namespace, key = %key, "Cache entry expired");
            self.record("expired");
            return None;
        }

        let Some(decoded) = decode(key, entry.clone()) else {
            self.record("corrupt");
            return None;
        };

        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entry);
        self.record("store_hit");

        Some(decoded)
    }

    /// Write `data` stamped with the current time.
    ///
    /// The memory layer is updated even if the store write fails.
    pub fn put<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        let data = serde_json::to_value(data).map_err(|e| CacheError::Parse(e.to_string()))?;
        let entry = StoredEntry {
            ts: self.clock.now().timestamp_millis(),
            data,
        };
        let raw = serde_json::to_string(&entry).map_err(|e| CacheError::Parse(e.to_string()))?;

        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entry);

        self.store.set_raw(&self.storage_key(key), &raw)
    }

    /// Drop `key` from both layers.
    pub fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        self.store.remove(&self.storage_key(key))
    }
}

fn decode<T: DeserializeOwned>(key: &str, entry: StoredEntry) -> Option<CacheEntry<T>> {
    let timestamp = DateTime::from_timestamp_millis(entry.ts)?;
    match serde_json::from_value(entry.data) {
        Ok(data) => Some(CacheEntry { data, timestamp }),
        Err(e) => {
            debug!(key = %key, error = %e, "Cache payload has unexpected shape");
            None
        }
    }
}
