//! Server configuration loaded from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::TimeDelta;
use finproxy::{DEFAULT_TABLE, ProxyError, Result, STALENESS_THRESHOLD};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const SQLITE_SCHEME: &str = "sqlite://";
const SQLITE_MEMORY: &str = "sqlite::memory:";

/// Which cache store backend to open.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// PostgREST table (e.g. a Supabase project).
    Postgrest {
        /// Project base URL.
        url: String,
        /// Service key sent with every request.
        key: String,
    },
    /// SQLite database file.
    SqliteFile(PathBuf),
    /// SQLite database living only as long as the process.
    SqliteMemory,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgrest { url, .. } => f
                .debug_struct("Postgrest")
                .field("url", url)
                .field("key", &"[REDACTED]")
                .finish(),
            Self::SqliteFile(path) => f.debug_tuple("SqliteFile").field(path).finish(),
            Self::SqliteMemory => f.write_str("SqliteMemory"),
        }
    }
}

/// Everything the server needs to start.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Polygon.io API key.
    pub polygon_api_key: String,
    /// Override for the Polygon base URL.
    pub upstream_base_url: Option<String>,
    /// Cache store backend.
    pub store: StoreConfig,
    /// Table holding cache rows, for every backend.
    pub table: String,
    /// Age after which cached payloads are refreshed.
    pub ttl: TimeDelta,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("polygon_api_key", &"[REDACTED]")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("store", &self.store)
            .field("table", &self.table)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// See [`ServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Blank values count as
    /// unset.
    ///
    /// # Errors
    /// Returns [`ProxyError::Config`] when a required variable is missing or
    /// a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &str| {
            get(name).ok_or_else(|| ProxyError::Config(format!("{name} must be set")))
        };

        let polygon_api_key = require("POLYGON_API_KEY")?;
        let store_url = require("CACHE_STORE_URL")?;

        let store = if store_url == SQLITE_MEMORY {
            StoreConfig::SqliteMemory
        } else if let Some(path) = store_url.strip_prefix(SQLITE_SCHEME) {
            if path.is_empty() {
                return Err(ProxyError::Config(
                    "CACHE_STORE_URL has no sqlite path".to_string(),
                ));
            }
            StoreConfig::SqliteFile(PathBuf::from(path))
        } else if store_url.starts_with("http://") || store_url.starts_with("https://") {
            StoreConfig::Postgrest {
                url: store_url,
                key: require("CACHE_STORE_KEY")?,
            }
        } else {
            return Err(ProxyError::Config(format!(
                "unsupported CACHE_STORE_URL: {store_url}"
            )));
        };

        let port = match get("API_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ProxyError::Config(format!("invalid API_PORT: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let ttl = match get("CACHE_TTL_HOURS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|hours| *hours > 0)
                .map(|hours| TimeDelta::hours(i64::from(hours)))
                .ok_or_else(|| ProxyError::Config(format!("invalid CACHE_TTL_HOURS: {raw}")))?,
            None => STALENESS_THRESHOLD,
        };

        Ok(Self {
            host: get("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            polygon_api_key,
            upstream_base_url: get("UPSTREAM_BASE_URL"),
            store,
            table: get("CACHE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            ttl,
        })
    }

    /// Socket address to bind.
    ///
    /// # Errors
    /// Returns [`ProxyError::Config`] if `host:port` is not a valid address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ProxyError::Config(format!("invalid bind address: {e}")))
    }
}
