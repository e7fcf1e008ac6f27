#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finproxy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the financials caching proxy.
//!
//! This crate provides the building blocks of the read-through engine:
//!
//! - [`Query`](query::Query) - A normalized financials query
//! - [`CacheKey`](key::CacheKey) - Composite cache key derived from a query
//! - [`Freshness`](freshness::Freshness) - HIT / STALE / MISS classification
//! - [`CacheStore`](store::CacheStore) - Persistent cache abstraction
//! - [`UpstreamFetcher`](fetcher::UpstreamFetcher) - Upstream provider abstraction

/// Error types shared across the workspace.
pub mod error;
/// Upstream fetcher trait.
pub mod fetcher;
/// Freshness evaluation of cache records.
pub mod freshness;
/// Composite cache key derivation.
pub mod key;
/// Query model and normalization.
pub mod query;
/// Cache record type.
pub mod record;
/// Cache store trait.
pub mod store;

// Re-export commonly used items at crate root
pub use error::{ErrorBody, ErrorClass, ProxyError, Result};
pub use fetcher::UpstreamFetcher;
pub use freshness::{Freshness, STALENESS_THRESHOLD};
pub use key::CacheKey;
pub use query::{
    DEFAULT_LIMIT, DEFAULT_SORT, DEFAULT_TIMEFRAME, Query, RawParams, SortOrder, Ticker,
    parse_or_default,
};
pub use record::CacheRecord;
pub use store::CacheStore;
