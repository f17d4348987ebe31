use std::fmt;

use serde::{Deserialize, Serialize};

/// Candle resolution understood by the upstream's indicator scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    Hour,
    Day,
}

impl Resolution {
    /// Wire value for the `resolution` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::OneMinute => "1",
            Self::FiveMinutes => "5",
            Self::FifteenMinutes => "15",
            Self::ThirtyMinutes => "30",
            Self::Hour => "60",
            Self::Day => "D",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Aggregate verdict of the upstream's technical indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisVerdict {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl AnalysisVerdict {
    /// Parses the provider's free-form signal label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "strong buy" => Some(Self::StrongBuy),
            "buy" => Some(Self::Buy),
            "neutral" => Some(Self::Neutral),
            "sell" => Some(Self::Sell),
            "strong sell" => Some(Self::StrongSell),
            _ => None,
        }
    }
}

/// Technical analysis summary for one instrument and resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub verdict: AnalysisVerdict,
    pub buy_votes: u32,
    pub neutral_votes: u32,
    pub sell_votes: u32,
    /// Whether the provider considers the instrument trending (ADX based)
    pub trending: Option<bool>,
}

impl TechnicalAnalysis {
    /// Sum of all votes; widened so provider-supplied counts cannot overflow.
    pub fn total_votes(&self) -> u64 {
        u64::from(self.buy_votes) + u64::from(self.neutral_votes) + u64::from(self.sell_votes)
    }
}
