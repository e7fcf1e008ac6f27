//! Composite cache key derivation.

use std::fmt;

use crate::query::{Query, SortOrder, Ticker};

const SEPARATOR: char = '|';
const ESCAPE: char = '\\';

/// Composite cache key built from the five query-defining fields.
///
/// Field order is fixed (ticker, timeframe, order, limit, sort) and is part of
/// the key's identity. Persistent stores map the fields one-to-one onto the
/// `ticker`, `timeframe`, `order_val`, `limit_val` and `sort` columns.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    ticker: Ticker,
    timeframe: String,
    order: SortOrder,
    limit: u32,
    sort: String,
}

impl CacheKey {
    /// Derives the key for a normalized query.
    #[must_use]
    pub fn from_query(query: &Query) -> Self {
        Self {
            ticker: query.ticker.clone(),
            timeframe: query.timeframe.clone(),
            order: query.order,
            limit: query.limit.get(),
            sort: query.sort.clone(),
        }
    }

    /// Ticker component.
    #[must_use]
    pub const fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Timeframe component.
    #[must_use]
    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    /// Order component.
    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }

    /// Limit component.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Sort component.
    #[must_use]
    pub fn sort(&self) -> &str {
        &self.sort
    }

    /// Encodes the key as a single string, `ticker|timeframe|order|limit|sort`.
    ///
    /// Separators and backslashes inside a component are backslash-escaped, so
    /// distinct keys never share an encoding.
    #[must_use]
    pub fn encode(&self) -> String {
        let limit = self.limit.to_string();
        let parts = [
            self.ticker.as_str(),
            self.timeframe.as_str(),
            self.order.as_str(),
            limit.as_str(),
            self.sort.as_str(),
        ];

        let mut out = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            for c in part.chars() {
                if c == SEPARATOR || c == ESCAPE {
                    out.push(ESCAPE);
                }
                out.push(c);
            }
        }
        out
    }
}

impl From<&Query> for CacheKey {
    fn from(query: &Query) -> Self {
        Self::from_query(query)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
