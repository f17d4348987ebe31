use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tradesync_market_data::{InstrumentId, Resolution};

use crate::cache::ResultSource;
use crate::errors::ValidationError;
use crate::language::Language;

/// Binary outcome of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart timeframe a signal is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M2,
    M5,
    M10,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 9] = [
        Timeframe::M1,
        Timeframe::M2,
        Timeframe::M5,
        Timeframe::M10,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    /// Compact label (`5m`, `4h`, `1d`).
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M2 => "2m",
            Timeframe::M5 => "5m",
            Timeframe::M10 => "10m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// Label as the UI renders it in the given language.
    pub fn display_label(&self, lang: Language) -> &'static str {
        match (lang, self) {
            (Language::En, Timeframe::M1) => "1 min",
            (Language::En, Timeframe::M2) => "2 min",
            (Language::En, Timeframe::M5) => "5 min",
            (Language::En, Timeframe::M10) => "10 min",
            (Language::En, Timeframe::M15) => "15 min",
            (Language::En, Timeframe::M30) => "30 min",
            (Language::En, Timeframe::H1) => "1 hour",
            (Language::En, Timeframe::H4) => "4 hours",
            (Language::En, Timeframe::D1) => "1 day",
            (Language::Ru, Timeframe::M1) => "1 мин",
            (Language::Ru, Timeframe::M2) => "2 мин",
            (Language::Ru, Timeframe::M5) => "5 мин",
            (Language::Ru, Timeframe::M10) => "10 мин",
            (Language::Ru, Timeframe::M15) => "15 мин",
            (Language::Ru, Timeframe::M30) => "30 мин",
            (Language::Ru, Timeframe::H1) => "1 час",
            (Language::Ru, Timeframe::H4) => "4 часа",
            (Language::Ru, Timeframe::D1) => "1 день",
        }
    }

    /// Closest candle resolution the upstream scan supports.
    pub fn resolution(&self) -> Resolution {
        match self {
            Timeframe::M1 | Timeframe::M2 => Resolution::OneMinute,
            Timeframe::M5 | Timeframe::M10 => Resolution::FiveMinutes,
            Timeframe::M15 => Resolution::FifteenMinutes,
            Timeframe::M30 => Resolution::ThirtyMinutes,
            Timeframe::H1 | Timeframe::H4 => Resolution::Hour,
            Timeframe::D1 => Resolution::Day,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    /// Accepts compact labels and the English and Russian UI labels,
    /// ignoring case and whitespace.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        let found = Timeframe::ALL.into_iter().find(|tf| {
            normalized == tf.label()
                || [Language::En, Language::Ru].into_iter().any(|lang| {
                    let label: String = tf
                        .display_label(lang)
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect();
                    normalized == label
                })
        });

        found.ok_or_else(|| ValidationError::UnknownTimeframe(raw.to_string()))
    }
}

/// Cache key of the signal variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalKey {
    pub instrument: InstrumentId,
    pub timeframe: Timeframe,
}

impl SignalKey {
    pub fn new(instrument: InstrumentId, timeframe: Timeframe) -> Self {
        Self {
            instrument,
            timeframe,
        }
    }
}

/// The cached, language-neutral signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPayload {
    pub id: String,
    pub direction: Direction,
    pub magnitude: u8,
    pub rationale: String,
    pub source: ResultSource,
}

/// Per-request production hints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalParams {
    /// Produced magnitudes must be strictly above this value.
    pub floor: Option<u8>,
}

/// Unsettled signal coming out of a fetch or a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalCandidate {
    /// `None` when the evidence is balanced.
    pub direction: Option<Direction>,
    pub basis: SignalBasis,
    pub source: ResultSource,
}

/// What a signal's rationale is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalBasis {
    /// Aggregate indicator votes from the upstream scan.
    Indicators { buy: u32, sell: u32, total: u64 },
    /// Canned rationale picked by the fallback generator.
    Heuristic(&'static str),
}

/// Caller request, as received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRequest {
    #[serde(default)]
    pub instrument: String,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub min_probability: Option<f64>,
    #[serde(default)]
    pub lang: Language,
}

/// Caller-facing signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: String,
    pub direction: Direction,
    pub probability: u8,
    pub reason: String,
    pub instrument: String,
    pub timeframe: String,
    pub timestamp: DateTime<Utc>,
}
