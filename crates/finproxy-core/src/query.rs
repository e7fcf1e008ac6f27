//! Query model and normalization.
//!
//! Raw request parameters arrive as a string map with any subset of keys
//! present. [`Query::from_params`] turns them into a fully populated [`Query`]:
//!
//! - `ticker` is required and must not be blank
//! - `timeframe` and `sort` fall back to their defaults
//! - `order` and `limit` go through [`parse_or_default`], so garbage becomes
//!   the default instead of an error

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::error::{ProxyError, Result};
use crate::key::CacheKey;

/// Raw query-string parameters as handed over by the HTTP layer.
pub type RawParams = HashMap<String, String>;

/// Default reporting timeframe.
pub const DEFAULT_TIMEFRAME: &str = "annual";

/// Default sort field.
pub const DEFAULT_SORT: &str = "filing_date";

/// Default number of results.
pub const DEFAULT_LIMIT: NonZeroU32 = NonZeroU32::new(100).unwrap();

/// A ticker symbol.
///
/// Tickers are trimmed and uppercased on creation and are never empty. The
/// uppercased form is what the upstream provider receives and what the cache
/// key is built from, so `aapl` and `AAPL` share one cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Creates a ticker, rejecting blank input.
    ///
    /// # Errors
    /// Returns [`ProxyError::Validation`] if `s` is empty after trimming.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ProxyError::Validation("ticker is required".to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ProxyError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

/// Result ordering requested from the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Wire representation (`"asc"` / `"desc"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ProxyError::Validation(format!(
                "order must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }
}

/// Parses `raw` into `T`, falling back to `default` when the value is absent
/// or does not parse.
///
/// ```
/// use finproxy_core::parse_or_default;
///
/// assert_eq!(parse_or_default(Some("25"), 100u32), 25);
/// assert_eq!(parse_or_default(Some("lots"), 100u32), 100);
/// assert_eq!(parse_or_default(None, 100u32), 100);
/// ```
pub fn parse_or_default<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

/// A normalized financials query.
///
/// Every field is populated; the five fields together identify a cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// Company ticker.
    pub ticker: Ticker,
    /// Reporting timeframe (e.g. "annual", "quarterly", "ttm").
    pub timeframe: String,
    /// Result ordering.
    pub order: SortOrder,
    /// Maximum number of results.
    pub limit: NonZeroU32,
    /// Field to sort by.
    pub sort: String,
}

impl Query {
    /// Creates a query for `ticker` with every other field defaulted.
    #[must_use]
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            timeframe: DEFAULT_TIMEFRAME.to_string(),
            order: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            sort: DEFAULT_SORT.to_string(),
        }
    }

    /// Normalizes raw request parameters into a query.
    ///
    /// Blank values are treated the same as missing ones.
    ///
    /// # Errors
    /// Returns [`ProxyError::Validation`] if `ticker` is missing or blank.
    pub fn from_params(params: &RawParams) -> Result<Self> {
        let ticker = non_blank(params, "ticker")
            .ok_or_else(|| ProxyError::Validation("ticker is required".to_string()))
            .and_then(Ticker::parse)?;

        Ok(Self {
            ticker,
            timeframe: non_blank(params, "timeframe")
                .unwrap_or(DEFAULT_TIMEFRAME)
                .to_string(),
            order: parse_or_default(non_blank(params, "order"), SortOrder::default()),
            limit: parse_or_default(non_blank(params, "limit"), DEFAULT_LIMIT),
            sort: non_blank(params, "sort").unwrap_or(DEFAULT_SORT).to_string(),
        })
    }

    /// Renders the query back into its canonical parameter map.
    #[must_use]
    pub fn to_params(&self) -> RawParams {
        HashMap::from([
            ("ticker".to_string(), self.ticker.to_string()),
            ("timeframe".to_string(), self.timeframe.clone()),
            ("order".to_string(), self.order.to_string()),
            ("limit".to_string(), self.limit.to_string()),
            ("sort".to_string(), self.sort.clone()),
        ])
    }

    /// Derives the composite cache key for this query.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from_query(self)
    }
}

fn non_blank<'a>(params: &'a RawParams, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let query = Query::from_params(&params(&[("ticker", "AAPL")])).unwrap();
        assert_eq!(query.ticker.as_str(), "AAPL");
        assert_eq!(query.timeframe, "annual");
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.limit.get(), 100);
        assert_eq!(query.sort, "filing_date");
    }

    #[test]
    fn test_explicit_values_kept() {
        let query = Query::from_params(&params(&[
            ("ticker", "msft"),
            ("timeframe", "quarterly"),
            ("order", "DESC"),
            ("limit", " 5 "),
            ("sort", "period_of_report_date"),
        ]))
        .unwrap();
        assert_eq!(query.ticker.as_str(), "MSFT");
        assert_eq!(query.timeframe, "quarterly");
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.limit.get(), 5);
        assert_eq!(query.sort, "period_of_report_date");
    }

    #[test]
    fn test_missing_ticker_is_validation_error() {
        let err = Query::from_params(&params(&[("limit", "10")])).unwrap_err();
        assert!(matches!(err, ProxyError::Validation(ref m) if m == "ticker is required"));

        let err = Query::from_params(&params(&[("ticker", "   ")])).unwrap_err();
        assert!(matches!(err, ProxyError::Validation(_)));
    }

    #[test]
    fn test_unparseable_limit_falls_back() {
        for raw in ["abc", "", "0", "-3", "12.5", "99999999999"] {
            let query = Query::from_params(&params(&[("ticker", "AAPL"), ("limit", raw)])).unwrap();
            assert_eq!(query.limit, DEFAULT_LIMIT, "limit={raw:?}");
        }
    }

    #[test]
    fn test_blank_fields_use_defaults() {
        let query = Query::from_params(&params(&[
            ("ticker", "AAPL"),
            ("timeframe", ""),
            ("order", " "),
            ("sort", ""),
        ]))
        .unwrap();
        assert_eq!(query, Query::new(Ticker::parse("AAPL").unwrap()));
    }

    #[test]
    fn test_unrecognized_order_falls_back() {
        for raw in ["sideways", "ascending", "1"] {
            let query = Query::from_params(&params(&[("ticker", "AAPL"), ("order", raw)])).unwrap();
            assert_eq!(query.order, SortOrder::Asc, "order={raw}");
        }

        let query = Query::from_params(&params(&[("ticker", "AAPL"), ("order", "DESC")])).unwrap();
        assert_eq!(query.order, SortOrder::Desc);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            params(&[("ticker", "aapl")]),
            params(&[("ticker", " tsla "), ("limit", "junk"), ("order", "Desc")]),
            params(&[
                ("ticker", "GOOG"),
                ("timeframe", "ttm"),
                ("limit", "3"),
                ("sort", "filing_date"),
            ]),
        ];
        for raw in &inputs {
            let once = Query::from_params(raw).unwrap();
            let twice = Query::from_params(&once.to_params()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_ticker_serde_rejects_blank() {
        assert!(serde_json::from_str::<Ticker>("\"\"").is_err());
        let t: Ticker = serde_json::from_str("\"nvda\"").unwrap();
        assert_eq!(t.as_str(), "NVDA");
    }
}
