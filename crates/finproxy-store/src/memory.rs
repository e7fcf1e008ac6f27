//! In-memory store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finproxy_core::{CacheKey, CacheRecord, CacheStore, Result};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory store for testing and development.
///
/// Records live in a `RwLock`-protected `HashMap` keyed by [`CacheKey`], which
/// gives the same one-record-per-key guarantee as the persistent stores. Data
/// is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<CacheKey, CacheRecord>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheRecord>> {
        let records = self.records.read().await;
        match records.get(key) {
            Some(record) => {
                debug!("Found cached record");
                Ok(Some(record.clone()))
            }
            None => {
                debug!("No cached record found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, payload), fields(key = %key))]
    async fn upsert(
        &self,
        key: &CacheKey,
        payload: &Value,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let record = CacheRecord::new(key.clone(), payload.clone(), updated_at);
        self.records.write().await.insert(key.clone(), record);
        debug!("Stored record");
        Ok(())
    }
}
