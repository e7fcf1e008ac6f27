#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finproxy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cache store implementations for the financials caching proxy.
//!
//! This crate provides implementations of the [`CacheStore`] trait from `finproxy-core`:
//!
//! - [`SqliteStore`] - Persistent SQLite-based store (default, requires `sqlite` feature)
//! - [`PostgrestStore`] - Remote table behind a PostgREST API (requires `postgrest` feature)
//! - [`InMemoryStore`] - Simple in-memory store for testing
//! - [`NoopStore`] - No-op store that doesn't keep anything

/// In-memory store implementation.
pub mod memory;
/// No-op store implementation.
pub mod noop;

/// SQLite-based store implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// PostgREST-backed store implementation.
#[cfg(feature = "postgrest")]
pub mod postgrest;

/// Default table name used by the persistent stores.
pub const DEFAULT_TABLE: &str = "financials_cache";

// Re-export the trait for convenience
pub use finproxy_core::CacheStore;

// Re-export implementations
pub use memory::InMemoryStore;
pub use noop::NoopStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "postgrest")]
pub use postgrest::PostgrestStore;
