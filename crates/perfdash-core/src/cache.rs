//! Cache trait for computed dashboard results.
//!
//! This module defines the [`ResultCache`] trait, a string keyed store with
//! per-entry expiry, and [`ResultCacheExt`] which layers JSON typed access on
//! top of any implementation.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::time::Duration;

use crate::{
    error::Result,
    period::PeriodKind,
    range::DateRange,
    types::CompanyId,
};

/// Trait for caching computed results with a time to live.
///
/// Implementations can store data in various backends (SQLite, in-memory, etc.).
/// Races between writers are harmless: the last write wins and a miss only
/// costs a recomputation.
#[async_trait]
pub trait ResultCache: Send + Sync + Debug {
    /// Retrieves a live entry.
    ///
    /// Returns `Ok(None)` if the key is absent or its entry has expired.
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Stores an entry that expires after `ttl`.
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Removes an entry. Returns true if one was present.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Removes expired entries.
    ///
    /// Returns the number of entries removed.
    async fn purge_expired(&self) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}

/// JSON typed access for any [`ResultCache`].
#[async_trait]
pub trait ResultCacheExt: ResultCache {
    /// Retrieves and deserializes a live entry.
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_raw(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Serializes and stores an entry that expires after `ttl`.
    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, json, ttl).await
    }
}

impl<C: ResultCache + ?Sized> ResultCacheExt for C {}

/// Key of a cached dashboard:
/// `dashboard:{company}:{fromYYYYMMDD}:{toYYYYMMDD}:{period}`.
#[must_use]
pub fn dashboard_cache_key(company: &CompanyId, range: &DateRange, period: PeriodKind) -> String {
    format!("dashboard:{company}:{}:{period}", range.compact_key())
}
