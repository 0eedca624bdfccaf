//! No-op cache implementation.

use async_trait::async_trait;
use perfdash_core::{ResultCache, Result};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get_raw` always returns `Ok(None)` and every write succeeds without effect.
/// Useful for disabling dashboard caching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResultCache;

impl NoopResultCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResultCache for NoopResultCache {
    async fn get_raw(&self, _key: &str) -> Result<Option<String>> {
        trace!("NoopResultCache: get_raw called, returning None");
        Ok(None)
    }

    async fn set_raw(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        trace!("NoopResultCache: set_raw called, doing nothing");
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<bool> {
        trace!("NoopResultCache: remove called, returning false");
        Ok(false)
    }

    async fn purge_expired(&self) -> Result<usize> {
        trace!("NoopResultCache: purge_expired called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopResultCache: clear called, doing nothing");
        Ok(())
    }
}
