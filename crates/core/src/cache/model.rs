use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_QUOTE_TTL_SECS, DEFAULT_SIGNAL_TTL_SECS, DEFAULT_UPSTREAM_TIMEOUT_MS, MAX_CACHE_TTL_SECS,
};

/// Where a payload came from. Kept for logs, never shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Upstream,
    Fallback,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Upstream => "upstream",
            ResultSource::Fallback => "fallback",
        }
    }
}

/// One authoritative result for a key and its validity window.
///
/// `expires_at` is always `produced_at + ttl`.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResult<K, P> {
    pub key: K,
    pub payload: P,
    pub produced_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<K, P> CachedResult<K, P> {
    pub fn new(key: K, payload: P, produced_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            key,
            payload,
            produced_at,
            expires_at: produced_at + ttl,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Timing policy of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Length of the window a produced result stays authoritative.
    pub ttl: Duration,
    /// Bound on a single upstream fetch before falling back.
    pub upstream_timeout: StdDuration,
}

impl CachePolicy {
    pub fn new(ttl: Duration, upstream_timeout: StdDuration) -> Self {
        Self {
            ttl,
            upstream_timeout,
        }
    }

    pub fn signals() -> Self {
        Self::new(
            Duration::seconds(DEFAULT_SIGNAL_TTL_SECS as i64),
            StdDuration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
        )
    }

    pub fn quotes() -> Self {
        Self::new(
            Duration::seconds(DEFAULT_QUOTE_TTL_SECS as i64),
            StdDuration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
        )
    }

    /// Sets the window length, capped at [`MAX_CACHE_TTL_SECS`].
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        let secs = i64::try_from(secs.min(MAX_CACHE_TTL_SECS)).unwrap_or(i64::MAX);
        self.ttl = Duration::seconds(secs);
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: StdDuration) -> Self {
        self.upstream_timeout = timeout;
        self
    }
}
