use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Currency;

/// Quote side used by every crypto pair on the supported venue.
const CRYPTO_QUOTE: &str = "USDT";

/// Asset classification, used for symbol grammar and fallback heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Forex,
    Crypto,
    Metals,
}

/// Named precious metals quoted against USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
    Palladium,
}

impl Metal {
    pub const ALL: [Metal; 4] = [Metal::Gold, Metal::Silver, Metal::Platinum, Metal::Palladium];

    /// Display name as callers send it (`GOLD`, `SILVER`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gold => "GOLD",
            Self::Silver => "SILVER",
            Self::Platinum => "PLATINUM",
            Self::Palladium => "PALLADIUM",
        }
    }

    /// ISO 4217 metal code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Gold => "XAU",
            Self::Silver => "XAG",
            Self::Platinum => "XPT",
            Self::Palladium => "XPD",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

/// Provider-agnostic instrument identifier.
/// This is what the cache keys and the services work with.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum InstrumentId {
    /// Foreign exchange pair
    Fx { base: Currency, quote: Currency },

    /// Cryptocurrency pair
    Crypto { base: Currency, quote: Currency },

    /// Precious metal
    Metal { metal: Metal, quote: Currency },
}

impl InstrumentId {
    /// Returns the asset category for this instrument
    pub fn category(&self) -> AssetCategory {
        match self {
            Self::Fx { .. } => AssetCategory::Forex,
            Self::Crypto { .. } => AssetCategory::Crypto,
            Self::Metal { .. } => AssetCategory::Metals,
        }
    }

    /// Base side of the pair (metal code for metals).
    pub fn base(&self) -> &str {
        match self {
            Self::Fx { base, .. } | Self::Crypto { base, .. } => base,
            Self::Metal { metal, .. } => metal.code(),
        }
    }

    /// Quote side of the pair.
    pub fn quote(&self) -> &str {
        match self {
            Self::Fx { quote, .. } | Self::Crypto { quote, .. } | Self::Metal { quote, .. } => {
                quote
            }
        }
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fx { base, quote } | Self::Crypto { base, quote } => {
                write!(f, "{}/{}", base, quote)
            }
            Self::Metal { metal, .. } => write!(f, "{}", metal.name()),
        }
    }
}

/// Error returned when a caller-supplied pair cannot be classified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized instrument: '{0}'")]
pub struct ParseInstrumentError(pub String);

impl FromStr for InstrumentId {
    type Err = ParseInstrumentError;

    /// Parses `EUR/USD`, `EURUSD`, `BTC/USDT` and the metal names.
    ///
    /// Flag emoji prefixes (`🇪🇺🇺🇸 EUR/USD`) and surrounding whitespace are ignored.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cleaned = strip_flags(raw);
        let err = || ParseInstrumentError(raw.to_string());

        if let Some(metal) = Metal::from_name(&cleaned) {
            return Ok(Self::Metal {
                metal,
                quote: Cow::Borrowed("USD"),
            });
        }

        let (base, quote) = match cleaned.split_once('/') {
            Some((base, quote)) => (base.trim(), quote.trim()),
            None if cleaned.len() == 6 && cleaned.is_ascii() => cleaned.split_at(3),
            None => return Err(err()),
        };

        if !is_code(base) || !is_code(quote) {
            return Err(err());
        }

        let base = Cow::Owned(base.to_ascii_uppercase());
        let quote = Cow::Owned(quote.to_ascii_uppercase());

        if base == CRYPTO_QUOTE || quote == CRYPTO_QUOTE {
            Ok(Self::Crypto { base, quote })
        } else {
            Ok(Self::Fx { base, quote })
        }
    }
}

/// Removes regional indicator symbols (flag emoji) and trims whitespace.
pub fn strip_flags(raw: &str) -> String {
    raw.chars()
        .filter(|c| !('\u{1F1E6}'..='\u{1F1FF}').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_code(part: &str) -> bool {
    (2..=6).contains(&part.len()) && part.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_pair() {
        let id: InstrumentId = "EUR/USD".parse().unwrap();
        assert_eq!(
            id,
            InstrumentId::Fx {
                base: Cow::Borrowed("EUR"),
                quote: Cow::Borrowed("USD"),
            }
        );
        assert_eq!(id.category(), AssetCategory::Forex);
        assert_eq!(id.to_string(), "EUR/USD");
    }

    #[test]
    fn test_compact_fx_pair() {
        let id: InstrumentId = "gbpjpy".parse().unwrap();
        assert_eq!(id.to_string(), "GBP/JPY");
    }

    #[test]
    fn test_crypto_pair() {
        let id: InstrumentId = "BTC/USDT".parse().unwrap();
        assert_eq!(id.category(), AssetCategory::Crypto);
        assert_eq!(id.base(), "BTC");
        assert_eq!(id.quote(), "USDT");
    }

    #[test]
    fn test_metal_names() {
        let id: InstrumentId = "gold".parse().unwrap();
        assert_eq!(id.category(), AssetCategory::Metals);
        assert_eq!(id.base(), "XAU");
        assert_eq!(id.to_string(), "GOLD");

        let id: InstrumentId = "PALLADIUM".parse().unwrap();
        assert_eq!(id.base(), "XPD");
    }

    #[test]
    fn test_flag_prefix_is_ignored() {
        let id: InstrumentId = "🇪🇺🇺🇸 EUR/USD".parse().unwrap();
        assert_eq!(id.to_string(), "EUR/USD");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<InstrumentId>().is_err());
        assert!("EUR/".parse::<InstrumentId>().is_err());
        assert!("E/USD".parse::<InstrumentId>().is_err());
        assert!("EUR-USD".parse::<InstrumentId>().is_err());
        assert!("XYZ".parse::<InstrumentId>().is_err());
    }

    #[test]
    fn test_equal_keys_for_equivalent_spellings() {
        let a: InstrumentId = "EUR/USD".parse().unwrap();
        let b: InstrumentId = " eurusd ".parse().unwrap();
        assert_eq!(a, b);
    }
}
