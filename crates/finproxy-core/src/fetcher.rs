//! Upstream fetcher trait.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{error::Result, query::Query};

/// Interface to the external financial-data provider.
///
/// The payload is opaque to the engine: it is cached and relayed verbatim.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync + Debug {
    /// Returns the name of this provider (e.g. "Polygon").
    fn name(&self) -> &str;

    /// Fetches the financials payload for `query`.
    ///
    /// # Errors
    /// Returns [`ProxyError::Network`](crate::ProxyError::Network),
    /// [`ProxyError::UpstreamStatus`](crate::ProxyError::UpstreamStatus) or
    /// [`ProxyError::Parse`](crate::ProxyError::Parse) on failure.
    async fn fetch(&self, query: &Query) -> Result<Value>;
}
