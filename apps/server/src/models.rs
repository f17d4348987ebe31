use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tradesync_core::quotes::QuoteView;
use tradesync_core::signals::{Direction, Signal, SignalRequest as CoreSignalRequest};
use tradesync_core::{Language, MarketStatus};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignalRequest {
    /// Pair as displayed, e.g. `EUR/USD`, `BTC/USDT` or `GOLD`.
    #[serde(default)]
    pub instrument: String,
    /// `1m` ... `1d`, or the English/Russian UI label.
    #[serde(default)]
    pub timeframe: String,
    /// Produced probability must exceed this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_probability: Option<f64>,
    /// `en` (default) or `ru`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl From<SignalRequest> for CoreSignalRequest {
    fn from(req: SignalRequest) -> Self {
        CoreSignalRequest {
            instrument: req.instrument,
            timeframe: req.timeframe,
            min_probability: req.min_probability,
            lang: req
                .lang
                .as_deref()
                .map(Language::from_code)
                .unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignalResponse {
    /// `BUY` or `SELL`.
    pub direction: String,
    pub probability: u8,
    pub reason: String,
    pub instrument: String,
    pub timeframe: String,
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Signal> for SignalResponse {
    fn from(signal: Signal) -> Self {
        Self {
            direction: match signal.direction {
                Direction::Buy => "BUY".to_string(),
                Direction::Sell => "SELL".to_string(),
            },
            probability: signal.probability,
            reason: signal.reason,
            instrument: signal.instrument,
            timeframe: signal.timeframe,
            id: signal.id,
            timestamp: signal.timestamp,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
pub struct QuotesRequest {
    #[serde(default)]
    pub pairs: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    /// Percent change.
    pub change: f64,
}

impl From<QuoteView> for Quote {
    fn from(view: QuoteView) -> Self {
        Self {
            price: view.price,
            change: view.change,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct QuotesResponse {
    pub quotes: BTreeMap<String, Quote>,
}

#[derive(Deserialize, IntoParams, Debug, Clone, Default)]
#[into_params(parameter_in = Query)]
pub struct LangQuery {
    /// `en` (default) or `ru`.
    pub lang: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatusResponse {
    pub is_open: bool,
    pub message: String,
}

impl From<MarketStatus> for MarketStatusResponse {
    fn from(status: MarketStatus) -> Self {
        Self {
            is_open: status.is_open,
            message: status.message,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
    pub status: String,
    pub upstream: String,
    pub upstream_configured: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ErrorResponse {
    pub error: String,
}
