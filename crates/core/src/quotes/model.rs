use serde::{Deserialize, Serialize};
use tradesync_market_data::InstrumentId;

use crate::cache::ResultSource;

/// Cache key of the quote variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    pub instrument: InstrumentId,
}

impl QuoteKey {
    pub fn new(instrument: InstrumentId) -> Self {
        Self { instrument }
    }
}

/// The cached quote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePayload {
    pub price: f64,
    pub change_percent: f64,
    pub source: ResultSource,
}

impl QuotePayload {
    /// A payload callers may see: positive, finite price and finite change.
    pub fn is_publishable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0 && self.change_percent.is_finite()
    }
}

/// Per-key quote memory: the last published price, seeding the fallback walk.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuoteState {
    pub last_price: Option<f64>,
}

/// Caller-facing quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteView {
    pub price: f64,
    /// Percent change.
    pub change: f64,
}

impl From<&QuotePayload> for QuoteView {
    fn from(payload: &QuotePayload) -> Self {
        Self {
            price: payload.price,
            change: payload.change_percent,
        }
    }
}
