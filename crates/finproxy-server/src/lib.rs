#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finproxy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use finproxy::{
    CacheStore, FinancialsService, PolygonFetcher, PostgrestStore, Result, SqliteStore,
};
use reqwest::Client;

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod shutdown;

pub use config::{ServerConfig, StoreConfig};
pub use error::ApiError;
pub use routes::{AppState, create_router};
pub use shutdown::shutdown_signal;

/// Open the configured cache store over `table`.
///
/// # Errors
/// Returns [`finproxy::ProxyError::Config`] if a SQLite database cannot be
/// opened or `table` is not a valid SQLite table name.
pub fn build_store(
    store: &StoreConfig,
    table: &str,
    client: &Client,
) -> Result<Arc<dyn CacheStore>> {
    Ok(match store {
        StoreConfig::Postgrest { url, key } => Arc::new(
            PostgrestStore::with_client(client.clone(), url.as_str(), key.as_str())
                .with_table(table),
        ),
        StoreConfig::SqliteFile(path) => Arc::new(SqliteStore::open(path)?.with_table(table)?),
        StoreConfig::SqliteMemory => Arc::new(SqliteStore::in_memory()?.with_table(table)?),
    })
}

/// Assemble the financials service from configuration.
///
/// # Errors
/// Fails when the cache store cannot be opened.
pub fn build_service(config: &ServerConfig, client: &Client) -> Result<FinancialsService> {
    let store = build_store(&config.store, &config.table, client)?;

    let mut fetcher = PolygonFetcher::with_client(client.clone(), config.polygon_api_key.as_str());
    if let Some(base_url) = &config.upstream_base_url {
        fetcher = fetcher.with_base_url(base_url.as_str());
    }

    Ok(FinancialsService::new(store, Arc::new(fetcher)).with_threshold(config.ttl))
}
