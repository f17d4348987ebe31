//! Error types for upstream market data operations.
//!
//! This module provides [`UpstreamError`], the typed failure returned by every
//! [`UpstreamClient`](crate::provider::UpstreamClient) call. Callers are expected
//! to recover from all of these locally; none of them is a terminal condition
//! for the service.

use thiserror::Error;

/// Errors that can occur while talking to the upstream provider.
///
/// The variants mirror the failure taxonomy the cache degrades on. Use
/// [`kind`](Self::kind) for a stable label in structured logs.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The request to the provider did not complete in time.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429/403), or the local
    /// token bucket was exhausted before the request was sent.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider answered, but the body was undecodable or incomplete.
    #[error("Malformed response from {provider}: {message}")]
    Malformed {
        /// The provider that returned the response
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The provider cannot be used: missing configuration, bad credentials,
    /// transport failure or a non-success status.
    #[error("Upstream unavailable: {provider} - {reason}")]
    Unavailable {
        /// The provider that is unavailable
        provider: String,
        /// Why it is unavailable
        reason: String,
    },
}

impl UpstreamError {
    /// Stable taxonomy label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "UpstreamTimeout",
            Self::RateLimited { .. } => "UpstreamRateLimited",
            Self::Malformed { .. } => "UpstreamMalformed",
            Self::Unavailable { .. } => "UpstreamUnavailable",
        }
    }

    /// Timeouts and rate limits are expected under load and are logged
    /// at a lower level than the other kinds.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let error = UpstreamError::Timeout {
            provider: "FINNHUB".to_string(),
        };
        assert_eq!(error.kind(), "UpstreamTimeout");

        let error = UpstreamError::RateLimited {
            provider: "FINNHUB".to_string(),
        };
        assert_eq!(error.kind(), "UpstreamRateLimited");

        let error = UpstreamError::Malformed {
            provider: "FINNHUB".to_string(),
            message: "missing field c".to_string(),
        };
        assert_eq!(error.kind(), "UpstreamMalformed");

        let error = UpstreamError::Unavailable {
            provider: "FINNHUB".to_string(),
            reason: "no api key".to_string(),
        };
        assert_eq!(error.kind(), "UpstreamUnavailable");
    }

    #[test]
    fn test_transient_classification() {
        assert!(UpstreamError::Timeout {
            provider: "FINNHUB".to_string()
        }
        .is_transient());
        assert!(UpstreamError::RateLimited {
            provider: "FINNHUB".to_string()
        }
        .is_transient());
        assert!(!UpstreamError::Unavailable {
            provider: "FINNHUB".to_string(),
            reason: "no api key".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = UpstreamError::RateLimited {
            provider: "FINNHUB".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: FINNHUB");

        let error = UpstreamError::Unavailable {
            provider: "FINNHUB".to_string(),
            reason: "HTTP 502".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Upstream unavailable: FINNHUB - HTTP 502"
        );
    }
}
