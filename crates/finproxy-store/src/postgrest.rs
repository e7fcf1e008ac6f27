//! PostgREST-backed store implementation.
//!
//! Talks to a `financials_cache` table exposed through a PostgREST API such as
//! Supabase's `/rest/v1`. Lookups filter on all five key columns; upserts post a
//! single row with `on_conflict` set to the same five columns and
//! `Prefer: resolution=merge-duplicates`, so the database's unique constraint
//! turns the insert into an overwrite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finproxy_core::{CacheKey, CacheRecord, CacheStore, ProxyError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, instrument};

use crate::DEFAULT_TABLE;

/// Conflict target for upserts; must match the table's unique constraint.
const CONFLICT_COLUMNS: &str = "ticker,timeframe,order_val,limit_val,sort";

/// Cache store backed by a PostgREST table.
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl fmt::Debug for PostgrestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestStore")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl PostgrestStore {
    /// Create a store for the project at `base_url` (e.g. `https://xyz.supabase.co`).
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    /// Create a store with a custom HTTP client.
    #[must_use]
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Use a table other than `financials_cache`.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Table endpoint URL.
    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Equality filters selecting the row for `key`.
    fn key_filters(key: &CacheKey) -> [(&'static str, String); 5] {
        [
            ("ticker", format!("eq.{}", key.ticker())),
            ("timeframe", format!("eq.{}", key.timeframe())),
            ("order_val", format!("eq.{}", key.order())),
            ("limit_val", format!("eq.{}", key.limit())),
            ("sort", format!("eq.{}", key.sort())),
        ]
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl CacheStore for PostgrestStore {
    fn name(&self) -> &str {
        "postgrest"
    }

    #[instrument(skip(self), fields(key = %key, table = %self.table))]
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheRecord>> {
        let response = self
            .authorized(self.client.get(self.endpoint()))
            .query(&Self::key_filters(key))
            .query(&[("select", "cached_data,updated_at"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| ProxyError::StoreRead(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProxyError::StoreRead(format!("HTTP {status}: {text}")));
        }

        let rows: Vec<CachedRow> = response
            .json()
            .await
            .map_err(|e| ProxyError::StoreRead(e.to_string()))?;

        match rows.into_iter().next() {
            Some(row) => {
                debug!("Found cached record");
                Ok(Some(CacheRecord::new(
                    key.clone(),
                    row.cached_data,
                    row.updated_at,
                )))
            }
            None => {
                debug!("No cached record found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, payload), fields(key = %key, table = %self.table))]
    async fn upsert(
        &self,
        key: &CacheKey,
        payload: &Value,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let row = UpsertRow {
            ticker: key.ticker().as_str(),
            timeframe: key.timeframe(),
            order_val: key.order().as_str(),
            limit_val: key.limit(),
            sort: key.sort(),
            cached_data: payload,
            updated_at,
        };

        let response = self
            .authorized(self.client.post(self.endpoint()))
            .query(&[("on_conflict", CONFLICT_COLUMNS)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(|e| ProxyError::StoreWrite(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProxyError::StoreWrite(format!("HTTP {status}: {text}")));
        }

        debug!("Stored record");
        Ok(())
    }
}

// ============================================================================
// PostgREST Row Types
// ============================================================================

/// Columns selected on lookup.
#[derive(Debug, Deserialize)]
struct CachedRow {
    cached_data: Value,
    updated_at: DateTime<Utc>,
}

/// Row posted on upsert.
#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    ticker: &'a str,
    timeframe: &'a str,
    order_val: &'a str,
    limit_val: u32,
    sort: &'a str,
    cached_data: &'a Value,
    updated_at: DateTime<Utc>,
}
