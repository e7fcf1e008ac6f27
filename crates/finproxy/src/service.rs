//! Read-through orchestration of cache store and upstream fetcher.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use finproxy_core::{
    CacheKey, CacheRecord, CacheStore, Freshness, Query, RawParams, Result, STALENESS_THRESHOLD,
    UpstreamFetcher,
};

use crate::response::FinancialsResponse;

/// Serves financials queries from a cache store, refreshing from upstream.
///
/// Each call runs the same protocol:
///
/// 1. Normalize the raw parameters into a [`Query`]; validation errors are
///    returned before any I/O.
/// 2. Derive the [`CacheKey`] and look it up. A failed lookup is logged and
///    treated as a miss.
/// 3. Evaluate [`Freshness`]. A hit is served as-is. Misses and stale records
///    both wait for an upstream fetch; stale data is never served.
/// 4. On fetch failure return the error and write nothing. On success write
///    the payload back (failures logged only) and return it.
///
/// No lock is held across the lookup, fetch and write. Concurrent requests
/// for the same key may each fetch and each write; the last write wins.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use finproxy::{FinancialsService, InMemoryStore, PolygonFetcher};
///
/// let service = FinancialsService::new(
///     Arc::new(InMemoryStore::new()),
///     Arc::new(PolygonFetcher::new("your_api_key")),
/// );
/// ```
#[derive(Clone)]
pub struct FinancialsService {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn UpstreamFetcher>,
    threshold: TimeDelta,
}

impl std::fmt::Debug for FinancialsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinancialsService")
            .field("store", &self.store.name())
            .field("fetcher", &self.fetcher.name())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl FinancialsService {
    /// Create a service over `store` and `fetcher` with the default 24 hour
    /// staleness threshold.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, fetcher: Arc<dyn UpstreamFetcher>) -> Self {
        Self {
            store,
            fetcher,
            threshold: STALENESS_THRESHOLD,
        }
    }

    /// Override the staleness threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: TimeDelta) -> Self {
        self.threshold = threshold;
        self
    }

    /// The staleness threshold in use.
    #[must_use]
    pub const fn threshold(&self) -> TimeDelta {
        self.threshold
    }

    /// Serve a financials query given raw request parameters.
    ///
    /// # Errors
    /// Returns [`ProxyError::Validation`](finproxy_core::ProxyError::Validation)
    /// for bad parameters and an upstream error variant when a refresh fails.
    /// Cache store failures are never returned.
    pub async fn fetch_financials(&self, params: &RawParams) -> Result<FinancialsResponse> {
        let query = Query::from_params(params).inspect_err(|e| {
            debug!(error = %e, "Rejected financials request");
        })?;
        self.fetch_query(&query).await
    }

    /// Serve an already normalized query.
    ///
    /// # Errors
    /// Returns an upstream error variant when a refresh fails.
    #[instrument(skip(self, query), fields(ticker = %query.ticker, key = tracing::field::Empty))]
    pub async fn fetch_query(&self, query: &Query) -> Result<FinancialsResponse> {
        let key = query.cache_key();
        tracing::Span::current().record("key", tracing::field::display(&key));

        let record = self.lookup(&key).await;
        let freshness = Freshness::evaluate(record.as_ref(), Utc::now(), self.threshold);

        match (freshness, record) {
            (Freshness::Hit, Some(record)) => {
                debug!(updated_at = %record.updated_at, "Cache hit for financials");
                return Ok(FinancialsResponse::cached(record.payload));
            }
            (Freshness::Stale, Some(record)) => {
                debug!(updated_at = %record.updated_at, "Cached financials are stale, refreshing");
            }
            _ => debug!("Cache miss for financials"),
        }

        let payload = match self.fetcher.fetch(query).await {
            Ok(payload) => payload,
            Err(e) => {
                error!(
                    provider = self.fetcher.name(),
                    error = %e,
                    "Failed to fetch financials"
                );
                return Err(e);
            }
        };

        info!(
            provider = self.fetcher.name(),
            freshness = %freshness,
            "Fetched financials from upstream"
        );

        self.write_back(key, payload.clone(), Utc::now()).await;
        Ok(FinancialsResponse::fresh(payload))
    }

    /// Look `key` up, degrading store failures to a miss.
    async fn lookup(&self, key: &CacheKey) -> Option<CacheRecord> {
        match self.store.get(key).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    store = self.store.name(),
                    error = %e,
                    "Cache lookup failed, treating as miss"
                );
                None
            }
        }
    }

    /// Best-effort write of a fresh payload.
    ///
    /// The write runs on its own task so it still completes if the request
    /// future is dropped while waiting on it.
    async fn write_back(&self, key: CacheKey, payload: Value, fetched_at: DateTime<Utc>) {
        let store = Arc::clone(&self.store);
        let store_name = store.name().to_string();
        let task = tokio::spawn(async move { store.upsert(&key, &payload, fetched_at).await });

        match task.await {
            Ok(Ok(())) => debug!(store = %store_name, "Cached financials"),
            Ok(Err(e)) => warn!(
                store = %store_name,
                error = %e,
                "Failed to cache financials"
            ),
            Err(e) => warn!(
                store = %store_name,
                error = %e,
                "Cache write task failed"
            ),
        }
    }
}
