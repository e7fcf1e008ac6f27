//! Freshness evaluation of cache records.
//!
//! [`Freshness::evaluate`] is a pure decision function: given the stored
//! record (if any), the current time and a staleness threshold it classifies
//! the lookup as [`Freshness::Hit`], [`Freshness::Stale`] or [`Freshness::Miss`].

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

use crate::record::CacheRecord;

/// Age after which a record is considered stale.
pub const STALENESS_THRESHOLD: TimeDelta = TimeDelta::hours(24);

/// Outcome of evaluating a cache lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Freshness {
    /// A record exists and is within the threshold.
    Hit,
    /// A record exists but is older than the threshold.
    Stale,
    /// No record exists.
    Miss,
}

impl Freshness {
    /// Classifies `record` relative to `now`.
    ///
    /// The comparison is strict: a record exactly `threshold` old is still a
    /// hit. Records dated in the future count as hits.
    #[must_use]
    pub fn evaluate(
        record: Option<&CacheRecord>,
        now: DateTime<Utc>,
        threshold: TimeDelta,
    ) -> Self {
        match record {
            None => Self::Miss,
            Some(record) if now.signed_duration_since(record.updated_at) > threshold => {
                Self::Stale
            }
            Some(_) => Self::Hit,
        }
    }

    /// Returns true if the cached payload can be served as-is.
    #[must_use]
    pub const fn is_servable(&self) -> bool {
        matches!(self, Self::Hit)
    }

    /// Lowercase label used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Stale => "stale",
            Self::Miss => "miss",
        }
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
