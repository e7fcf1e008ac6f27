//! No-op store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finproxy_core::{CacheKey, CacheRecord, CacheStore, Result};
use serde_json::Value;
use tracing::trace;

/// A no-op store that doesn't keep anything.
///
/// `get` always returns `Ok(None)` and `upsert` always returns `Ok(())`, so
/// every request goes upstream. Useful for disabling caching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl NoopStore {
    /// Create a new no-op store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for NoopStore {
    fn name(&self) -> &str {
        "noop"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheRecord>> {
        trace!(%key, "NoopStore: get called, returning None");
        Ok(None)
    }

    async fn upsert(
        &self,
        key: &CacheKey,
        _payload: &Value,
        _updated_at: DateTime<Utc>,
    ) -> Result<()> {
        trace!(%key, "NoopStore: upsert called, doing nothing");
        Ok(())
    }
}
