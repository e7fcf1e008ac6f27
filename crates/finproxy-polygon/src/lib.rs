#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finproxy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Polygon.io financials fetcher.
//!
//! This crate implements the [`UpstreamFetcher`] trait for the
//! [Polygon.io](https://polygon.io/) financials reference API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use finproxy_core::{Query, Ticker, UpstreamFetcher};
//! use finproxy_polygon::PolygonFetcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = PolygonFetcher::new("your_api_key");
//!
//!     let query = Query::new(Ticker::parse("AAPL")?);
//!     let payload = fetcher.fetch(&query).await?;
//!     println!("{}", payload["results"]);
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use finproxy_core::{ProxyError, Query, Result, UpstreamFetcher};
use reqwest::Client;
use serde_json::Value;
use std::fmt;

/// Base URL for the Polygon REST API.
const POLYGON_BASE_URL: &str = "https://api.polygon.io";

/// Financials reference endpoint, relative to the base URL.
const FINANCIALS_ENDPOINT: &str = "vX/reference/financials";

/// Values of the body `status` field that signal failure despite a 2xx status.
const ERROR_STATUSES: &[&str] = &["ERROR", "NOT_AUTHORIZED", "NOT_FOUND"];

/// Polygon.io financials fetcher.
///
/// Forwards the five query fields to `/vX/reference/financials` and returns
/// the response body as an opaque JSON object.
#[derive(Clone)]
pub struct PolygonFetcher {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for PolygonFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolygonFetcher")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl PolygonFetcher {
    /// Create a new Polygon fetcher with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Create a new Polygon fetcher with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: POLYGON_BASE_URL.to_string(),
        }
    }

    /// Point the fetcher at a different host (proxies, mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL of the financials endpoint.
    fn url(&self) -> String {
        format!("{}/{FINANCIALS_ENDPOINT}", self.base_url)
    }

    /// Maps a query onto Polygon's parameter names.
    fn params(query: &Query) -> [(&'static str, String); 5] {
        [
            ("ticker", query.ticker.to_string()),
            ("timeframe", query.timeframe.clone()),
            ("order", query.order.to_string()),
            ("limit", query.limit.to_string()),
            ("sort", query.sort.clone()),
        ]
    }

    /// Rejects bodies that are not objects or that report an error status.
    fn check_body(status: u16, body: Value) -> Result<Value> {
        let Value::Object(map) = &body else {
            return Err(ProxyError::Parse(format!(
                "expected a JSON object, got: {body}"
            )));
        };

        let failed = map
            .get("status")
            .and_then(Value::as_str)
            .filter(|state| ERROR_STATUSES.contains(state));
        if let Some(state) = failed {
            let message = map
                .get("error")
                .or_else(|| map.get("message"))
                .and_then(Value::as_str)
                .unwrap_or(state);
            return Err(ProxyError::UpstreamStatus {
                status,
                body: message.to_string(),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl UpstreamFetcher for PolygonFetcher {
    fn name(&self) -> &str {
        "Polygon"
    }

    async fn fetch(&self, query: &Query) -> Result<Value> {
        tracing::debug!(ticker = %query.ticker, "Polygon financials request");

        let response = self
            .client
            .get(self.url())
            .query(&Self::params(query))
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProxyError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProxyError::Network(e.without_url().to_string()))?;

        let body: Value =
            serde_json::from_str(&text).map_err(|e| ProxyError::Parse(format!("{e}: {text}")))?;

        Self::check_body(status.as_u16(), body)
    }
}
