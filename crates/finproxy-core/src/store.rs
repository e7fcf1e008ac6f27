//! Cache store trait for persisting fetched financials.
//!
//! This module defines the [`CacheStore`] trait: a keyed lookup and a full
//! replace upsert against a persistent table. The orchestrator treats both as
//! best-effort; implementations simply report what went wrong.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{error::Result, key::CacheKey, record::CacheRecord};

/// Trait for persistent cache backends.
///
/// Persistent implementations must enforce uniqueness on the five key columns
/// so that concurrent upserts for the same key overwrite instead of duplicate.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns a short backend name for logs (e.g. "sqlite").
    fn name(&self) -> &str;

    /// Looks up the record stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is cached.
    ///
    /// # Errors
    /// Returns [`ProxyError::StoreRead`](crate::ProxyError::StoreRead) when the
    /// backend cannot be reached or rejects the query.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheRecord>>;

    /// Stores `payload` under `key`, replacing any existing record.
    ///
    /// # Errors
    /// Returns [`ProxyError::StoreWrite`](crate::ProxyError::StoreWrite) when
    /// the backend cannot be reached or rejects the write.
    async fn upsert(&self, key: &CacheKey, payload: &Value, updated_at: DateTime<Utc>)
    -> Result<()>;
}
