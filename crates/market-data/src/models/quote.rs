use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest quote as reported by the upstream provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpstreamQuote {
    /// Current price, always > 0
    pub price: f64,

    /// Percent change since previous close
    pub change_percent: f64,

    /// Timestamp reported by the provider (or fetch time when absent)
    pub timestamp: DateTime<Utc>,

    /// Source of the quote (FINNHUB, ...)
    pub source: String,
}
