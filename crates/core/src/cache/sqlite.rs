//! SQLite-backed cache store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheError, CacheStore};

/// SQLite-backed key-value store.
pub struct SqliteCacheStore {
    conn: Mutex<Connection>,
}

impl SqliteCacheStore {
    /// Open (or create) the database file and table.
    pub fn new(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Internal("cache connection lock poisoned".to_string()))
    }
}

impl CacheStore for SqliteCacheStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT value FROM kv_cache WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| CacheError::Database(e.to_string()))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv_cache (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv_cache WHERE key = ?", params![key])
            .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let store = SqliteCacheStore::in_memory().unwrap();
        store.set_raw("a", "1").unwrap();
        assert_eq!(store.get_raw("a").unwrap().as_deref(), Some("1"));
        assert!(store.get_raw("b").unwrap().is_none());
    }

    #[test]
    fn test_set_replaces_value() {
        let store = SqliteCacheStore::in_memory().unwrap();
        store.set_raw("a", "1").unwrap();
        store.set_raw("a", "2").unwrap();
        assert_eq!(store.get_raw("a").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_remove() {
        let store = SqliteCacheStore::in_memory().unwrap();
        store.set_raw("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("missing").unwrap();
        assert!(store.get_raw("a").unwrap().is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.db");

        {
            let store = SqliteCacheStore::new(&path).unwrap();
            store.set_raw("movie:US", r#"{"ts":0,"data":{}}"#).unwrap();
        }

        let store = SqliteCacheStore::new(&path).unwrap();
        assert_eq!(
            store.get_raw("movie:US").unwrap().as_deref(),
            Some(r#"{"ts":0,"data":{}}"#)
        );
    }
}
