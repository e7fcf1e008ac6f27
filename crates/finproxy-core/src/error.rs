//! Error types for proxy operations.
//!
//! This module defines [`ProxyError`] which covers every failure the engine can
//! observe, and [`ErrorClass`] which says how a failure is reported to callers.
//! Store failures exist as variants but are absorbed by the orchestrator; only
//! validation and upstream failures ever reach a caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while serving a financials query.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The request is missing a required field or carries an invalid value.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The cache store could not be read.
    #[error("Cache store read failed: {0}")]
    StoreRead(String),

    /// The cache store rejected or failed a write.
    #[error("Cache store write failed: {0}")]
    StoreWrite(String),

    /// Network failure talking to the upstream provider.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream provider answered with an error status.
    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code of the upstream response.
        status: u16,
        /// Response body or provider error message.
        body: String,
    },

    /// The upstream response could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using [`ProxyError`].
pub type Result<T> = std::result::Result<T, ProxyError>;

/// How an error is classified when reported to a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Caused by the request itself.
    Client,
    /// Caused by the upstream provider.
    Upstream,
    /// Any other server-side failure.
    Internal,
}

impl ErrorClass {
    /// Returns true for server-side classifications.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Upstream | Self::Internal)
    }
}

impl ProxyError {
    /// Returns the caller-facing classification of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::Client,
            Self::Network(_) | Self::UpstreamStatus { .. } | Self::Parse(_) => ErrorClass::Upstream,
            Self::StoreRead(_) | Self::StoreWrite(_) | Self::Config(_) => ErrorClass::Internal,
        }
    }

    /// Returns true if this error originated at the upstream provider.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self.class(), ErrorClass::Upstream)
    }

    /// Short summary used as the `error` field of an [`ErrorBody`].
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid request",
            Self::StoreRead(_) | Self::StoreWrite(_) => "Cache store failure",
            Self::Network(_) | Self::UpstreamStatus { .. } | Self::Parse(_) => {
                "Failed to fetch financial data"
            }
            Self::Config(_) => "Server misconfigured",
        }
    }
}

/// Error object returned to callers: `{ "error": ..., "details": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable error summary.
    pub error: String,
    /// Diagnostic detail, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Creates an error body without details.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Sets the diagnostic detail.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&ProxyError> for ErrorBody {
    fn from(err: &ProxyError) -> Self {
        match err {
            // Validation messages are already caller-facing.
            ProxyError::Validation(msg) => Self::new(msg.clone()),
            other => Self::new(other.summary()).with_details(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            ProxyError::Validation("ticker is required".into()).class(),
            ErrorClass::Client
        );
        assert_eq!(
            ProxyError::Network("timeout".into()).class(),
            ErrorClass::Upstream
        );
        assert_eq!(
            ProxyError::UpstreamStatus {
                status: 500,
                body: String::new()
            }
            .class(),
            ErrorClass::Upstream
        );
        assert_eq!(
            ProxyError::StoreRead("down".into()).class(),
            ErrorClass::Internal
        );
        assert!(ErrorClass::Upstream.is_server_error());
        assert!(!ErrorClass::Client.is_server_error());
    }

    #[test]
    fn test_error_body_for_validation_has_no_details() {
        let body = ErrorBody::from(&ProxyError::Validation("ticker is required".into()));
        assert_eq!(body.error, "ticker is required");
        assert!(body.details.is_none());

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "ticker is required" }));
    }

    #[test]
    fn test_error_body_for_upstream_carries_details() {
        let err = ProxyError::UpstreamStatus {
            status: 503,
            body: "unavailable".into(),
        };
        let body = ErrorBody::from(&err);
        assert_eq!(body.error, "Failed to fetch financial data");
        assert_eq!(body.details.as_deref(), Some("Upstream returned 503: unavailable"));
    }
}
