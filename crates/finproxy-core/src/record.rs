//! Cache record type.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::key::CacheKey;

/// A cached upstream response.
///
/// One record exists per [`CacheKey`]; a refresh overwrites it in place.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheRecord {
    /// Key the record is stored under.
    pub key: CacheKey,
    /// Opaque provider payload.
    pub payload: Value,
    /// Time of the upstream fetch that produced `payload`.
    pub updated_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Creates a new record.
    #[must_use]
    pub const fn new(key: CacheKey, payload: Value, updated_at: DateTime<Utc>) -> Self {
        Self {
            key,
            payload,
            updated_at,
        }
    }
}
