#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finproxy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Read-through caching proxy for financial-reference data.
//!
//! This crate wires a [`CacheStore`] and an [`UpstreamFetcher`] into the
//! [`FinancialsService`], which serves queries from the cache while they are
//! fresh and refreshes them from upstream otherwise. It re-exports the core
//! types and the store and fetcher implementations.
//!
//! # Features
//!
//! - `polygon` - Polygon.io upstream fetcher
//! - `store-sqlite` - SQLite cache store
//! - `store-postgrest` - PostgREST (Supabase) cache store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use finproxy::{FinancialsService, PolygonFetcher, RawParams, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> finproxy::Result<()> {
//!     let service = FinancialsService::new(
//!         Arc::new(SqliteStore::open("cache.db")?),
//!         Arc::new(PolygonFetcher::new("your_api_key")),
//!     );
//!
//!     let params = RawParams::from([("ticker".to_string(), "AAPL".to_string())]);
//!     let response = service.fetch_financials(&params).await?;
//!     println!("from cache: {}", response.from_cache);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use finproxy_core::*;

// Store implementations
#[cfg(feature = "store-postgrest")]
pub use finproxy_store::PostgrestStore;
#[cfg(feature = "store-sqlite")]
pub use finproxy_store::SqliteStore;
pub use finproxy_store::{DEFAULT_TABLE, InMemoryStore, NoopStore};

// Fetchers
#[cfg(feature = "polygon")]
pub use finproxy_polygon::PolygonFetcher;

mod response;
mod service;
pub use response::FinancialsResponse;
pub use service::FinancialsService;
