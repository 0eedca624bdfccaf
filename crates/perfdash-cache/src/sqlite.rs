//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use perfdash_core::{DashboardError, ResultCache, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// SQLite-based cache for computed results.
///
/// This cache stores entries in a SQLite database file, providing persistence
/// across application restarts. Expiry instants are stored as Unix
/// milliseconds and compared on every read.
#[derive(Debug)]
pub struct SqliteResultCache {
    conn: Mutex<Connection>,
}

impl SqliteResultCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DashboardError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DashboardError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS result_cache (
                cache_key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                cached_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| DashboardError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_result_cache_expires_at
             ON result_cache(expires_at)",
            [],
        )
        .map_err(|e| DashboardError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DashboardError::Cache(e.to_string()))
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl ResultCache for SqliteResultCache {
    #[instrument(skip(self))]
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT value FROM result_cache
                 WHERE cache_key = ?1 AND expires_at > ?2",
                params![key, Self::now_millis()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| DashboardError::Cache(e.to_string()))?;

        match result {
            Some(value) => {
                debug!("Found cached entry");
                Ok(Some(value))
            }
            None => {
                debug!("No live cached entry found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|e| DashboardError::Cache(format!("Invalid TTL duration: {e}")))?;
        let expires_at = Self::now_millis().saturating_add(ttl.num_milliseconds());
        let cached_at = Utc::now().to_rfc3339();

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO result_cache (cache_key, value, expires_at, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, value, expires_at, cached_at],
        )
        .map_err(|e| DashboardError::Cache(e.to_string()))?;

        debug!("Cached entry");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn
            .execute("DELETE FROM result_cache WHERE cache_key = ?1", params![key])
            .map_err(|e| DashboardError::Cache(e.to_string()))?;
        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn
            .execute(
                "DELETE FROM result_cache WHERE expires_at <= ?1",
                params![Self::now_millis()],
            )
            .map_err(|e| DashboardError::Cache(e.to_string()))?;

        if deleted > 0 {
            debug!("Purged {} expired cache entries", deleted);
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM result_cache", [])
            .map_err(|e| DashboardError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}
