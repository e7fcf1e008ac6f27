//! SQLite-based store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finproxy_core::{CacheKey, CacheRecord, CacheStore, ProxyError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

use crate::DEFAULT_TABLE;

/// SQLite-based cache store.
///
/// Records are kept in a `financials_cache` table (see [`SqliteStore::with_table`])
/// whose primary key is the five key columns, so an upsert replaces the
/// existing row for a key. Blocking rusqlite calls run on
/// `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteStore {
    /// Open (or create) a SQLite store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| ProxyError::Config(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| ProxyError::Config(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Use `table` instead of `financials_cache`, creating it if needed.
    ///
    /// # Errors
    /// Returns [`ProxyError::Config`] if `table` is not a plain SQL identifier
    /// (ASCII letters, digits and underscores, not starting with a digit) or
    /// the table cannot be created.
    pub fn with_table(self, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        let valid = table
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ProxyError::Config(format!("invalid table name: {table:?}")));
        }

        {
            let conn = self
                .conn
                .lock()
                .map_err(|e| ProxyError::Config(e.to_string()))?;
            create_table(&conn, &table)?;
        }
        Ok(Self {
            conn: self.conn,
            table,
        })
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        create_table(&conn, DEFAULT_TABLE)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: DEFAULT_TABLE.to_string(),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, to_err: fn(String) -> ProxyError, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| to_err(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| to_err(e.to_string()))?
    }

    #[cfg(test)]
    fn row_count(&self) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
            row.get::<_, i64>(0)
        })
        .unwrap() as usize
    }
}

fn create_table(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                ticker TEXT NOT NULL,
                timeframe TEXT NOT NULL,
                order_val TEXT NOT NULL,
                limit_val INTEGER NOT NULL,
                sort TEXT NOT NULL,
                cached_data TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (ticker, timeframe, order_val, limit_val, sort)
            )"
        ),
        [],
    )
    .map_err(|e| ProxyError::Config(e.to_string()))?;

    debug!(table, "SQLite store schema initialized");
    Ok(())
}

#[async_trait]
impl CacheStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheRecord>> {
        let key = key.clone();
        let table = self.table.clone();
        let record = self
            .run(ProxyError::StoreRead, move |conn| {
                let row = conn
                    .query_row(
                        &format!(
                            "SELECT cached_data, updated_at FROM {table}
                             WHERE ticker = ?1 AND timeframe = ?2 AND order_val = ?3
                               AND limit_val = ?4 AND sort = ?5"
                        ),
                        params![
                            key.ticker().as_str(),
                            key.timeframe(),
                            key.order().as_str(),
                            key.limit(),
                            key.sort()
                        ],
                        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                    )
                    .optional()
                    .map_err(|e| ProxyError::StoreRead(e.to_string()))?;

                let Some((data_json, updated_at)) = row else {
                    return Ok(None);
                };

                let payload: Value = serde_json::from_str(&data_json)
                    .map_err(|e| ProxyError::StoreRead(format!("corrupt cached_data: {e}")))?;
                let updated_at = DateTime::parse_from_rfc3339(&updated_at)
                    .map_err(|e| ProxyError::StoreRead(format!("corrupt updated_at: {e}")))?
                    .with_timezone(&Utc);

                Ok(Some(CacheRecord::new(key, payload, updated_at)))
            })
            .await?;

        match &record {
            Some(_) => debug!("Found cached record"),
            None => debug!("No cached record found"),
        }
        Ok(record)
    }

    #[instrument(skip(self, payload), fields(key = %key))]
    async fn upsert(
        &self,
        key: &CacheKey,
        payload: &Value,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let key = key.clone();
        let data_json =
            serde_json::to_string(payload).map_err(|e| ProxyError::StoreWrite(e.to_string()))?;
        let updated_at = updated_at.to_rfc3339();
        let table = self.table.clone();

        self.run(ProxyError::StoreWrite, move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {table}
                     (ticker, timeframe, order_val, limit_val, sort, cached_data, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT (ticker, timeframe, order_val, limit_val, sort)
                     DO UPDATE SET cached_data = excluded.cached_data,
                                   updated_at = excluded.updated_at"
                ),
                params![
                    key.ticker().as_str(),
                    key.timeframe(),
                    key.order().as_str(),
                    key.limit(),
                    key.sort(),
                    data_json,
                    updated_at
                ],
            )
            .map_err(|e| ProxyError::StoreWrite(e.to_string()))?;
            Ok(())
        })
        .await?;

        debug!("Stored record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use finproxy_core::{Query, SortOrder, Ticker};
    use serde_json::json;

    fn key(ticker: &str) -> CacheKey {
        Query::new(Ticker::parse(ticker).unwrap()).cache_key()
    }

    #[tokio::test]
    async fn test_sqlite_store_initialization() {
        let store = SqliteStore::in_memory();
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_get_and_upsert() {
        let store = SqliteStore::in_memory().unwrap();
        let key = key("AAPL");

        // Initially no data
        assert!(store.get(&key).await.unwrap().is_none());

        let now = Utc::now();
        let payload = json!({ "status": "OK", "results": [{ "fiscal_year": "2023" }] });
        store.upsert(&key, &payload, now).await.unwrap();

        let record = store.get(&key).await.unwrap().unwrap();
        assert_eq!(record.key, key);
        assert_eq!(record.payload, payload);
        assert_eq!(record.updated_at, now);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let store = SqliteStore::in_memory().unwrap();
        let key = key("AAPL");
        let old = Utc::now() - TimeDelta::hours(48);
        let new = Utc::now();

        store.upsert(&key, &json!({ "v": "old" }), old).await.unwrap();
        store.upsert(&key, &json!({ "v": "new" }), new).await.unwrap();

        assert_eq!(store.row_count(), 1);
        let record = store.get(&key).await.unwrap().unwrap();
        assert_eq!(record.payload, json!({ "v": "new" }));
        assert_eq!(record.updated_at, new);
    }

    #[tokio::test]
    async fn test_distinct_keys_get_distinct_rows() {
        let store = SqliteStore::in_memory().unwrap();
        let asc = key("AAPL");
        let mut query = Query::new(Ticker::parse("AAPL").unwrap());
        query.order = SortOrder::Desc;
        let desc = query.cache_key();

        store.upsert(&asc, &json!({ "o": "asc" }), Utc::now()).await.unwrap();
        store.upsert(&desc, &json!({ "o": "desc" }), Utc::now()).await.unwrap();

        assert_eq!(store.row_count(), 2);
        assert_eq!(
            store.get(&desc).await.unwrap().unwrap().payload,
            json!({ "o": "desc" })
        );
    }

    #[tokio::test]
    async fn test_schema_enforces_key_uniqueness() {
        let store = SqliteStore::in_memory().unwrap();
        let conn = store.conn.lock().unwrap();
        let insert = format!(
            "INSERT INTO {DEFAULT_TABLE}
             (ticker, timeframe, order_val, limit_val, sort, cached_data, updated_at)
             VALUES ('AAPL', 'annual', 'asc', 100, 'filing_date', '{{}}', '2024-01-01T00:00:00Z')"
        );
        conn.execute(&insert, []).unwrap();
        assert!(conn.execute(&insert, []).is_err());
    }

    #[tokio::test]
    async fn test_corrupt_row_is_read_error() {
        let store = SqliteStore::in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                &format!(
                    "INSERT INTO {DEFAULT_TABLE}
                     (ticker, timeframe, order_val, limit_val, sort, cached_data, updated_at)
                     VALUES ('AAPL', 'annual', 'asc', 100, 'filing_date', 'not json', 'yesterday')"
                ),
                [],
            )
            .unwrap();
        }

        let err = store.get(&key("AAPL")).await.unwrap_err();
        assert!(matches!(err, ProxyError::StoreRead(_)));
    }

    #[tokio::test]
    async fn test_custom_table() {
        let store = SqliteStore::in_memory()
            .unwrap()
            .with_table("fin_cache_v2")
            .unwrap();
        let key = key("NVDA");

        store.upsert(&key, &json!({ "t": 1 }), Utc::now()).await.unwrap();
        assert_eq!(store.row_count(), 1);

        let conn = store.conn.lock().unwrap();
        let default_rows: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {DEFAULT_TABLE}"), [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(default_rows, 0);
    }

    #[tokio::test]
    async fn test_rejects_unsafe_table_name() {
        for name in ["", "1cache", "cache; DROP TABLE x", "fin-cache"] {
            let err = SqliteStore::in_memory().unwrap().with_table(name).err().unwrap();
            assert!(matches!(err, ProxyError::Config(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let key = key("MSFT");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .upsert(&key, &json!({ "results": [] }), Utc::now())
                .await
                .unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert!(reopened.get(&key).await.unwrap().is_some());
    }
}
