use rand::seq::SliceRandom;
use rand::Rng;
use tradesync_market_data::{AssetCategory, InstrumentId, Metal};

use crate::cache::ResultSource;
use crate::quotes::QuotePayload;
use crate::signals::Direction;

/// Rationales attached to synthetic signals.
pub const FALLBACK_RATIONALES: [&str; 5] = [
    "Chart pattern analysis",
    "Technical indicators",
    "Price movements",
    "Support/resistance levels",
    "Trend analysis",
];

/// Synthetic directional outcome before alternation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackSignal {
    pub direction: Direction,
    pub rationale: &'static str,
}

/// Plausible payloads with no upstream dependency.
///
/// The shape of every value (its range, precision and jitter band) depends
/// only on the instrument; the value itself comes from the supplied RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    /// A quote near `last_price` when one is known, otherwise a draw from the
    /// instrument's static base band.
    pub fn quote<R: Rng>(
        &self,
        instrument: &InstrumentId,
        last_price: Option<f64>,
        rng: &mut R,
    ) -> QuotePayload {
        let category = instrument.category();

        let price = match last_price.filter(|p| p.is_finite() && *p > 0.0) {
            Some(last) => {
                let jitter = walk_band(category);
                last * (1.0 + rng.gen_range(-jitter..=jitter))
            }
            None => {
                let (lo, hi) = base_band(instrument);
                rng.gen_range(lo..=hi)
            }
        };

        let change = change_band(category);
        let change_percent = rng.gen_range(-change..=change);

        QuotePayload {
            price: round_to(price, price_decimals(instrument, price)),
            change_percent: round_to(change_percent, 2),
            source: ResultSource::Fallback,
        }
    }

    /// A random direction with a canned rationale.
    pub fn signal<R: Rng>(&self, rng: &mut R) -> FallbackSignal {
        let direction = if rng.gen_bool(0.5) {
            Direction::Buy
        } else {
            Direction::Sell
        };
        let rationale = FALLBACK_RATIONALES
            .choose(rng)
            .copied()
            .unwrap_or(FALLBACK_RATIONALES[0]);

        FallbackSignal {
            direction,
            rationale,
        }
    }
}

/// Static price band used before any real price is known.
fn base_band(instrument: &InstrumentId) -> (f64, f64) {
    match instrument {
        InstrumentId::Metal { metal, .. } => match metal {
            Metal::Gold => (2650.0, 2700.0),
            Metal::Silver => (30.0, 32.0),
            Metal::Platinum => (950.0, 1000.0),
            Metal::Palladium => (1000.0, 1100.0),
        },
        InstrumentId::Crypto { .. } => match instrument.base() {
            "BTC" => (95_000.0, 100_000.0),
            "ETH" => (3_300.0, 3_600.0),
            "BNB" => (600.0, 700.0),
            "SOL" => (180.0, 220.0),
            "XRP" => (2.0, 2.5),
            "TON" => (5.0, 6.0),
            "DOGE" => (0.3, 0.4),
            "ADA" => (0.9, 1.1),
            _ => (1.0, 100.0),
        },
        InstrumentId::Fx { .. } => match (instrument.base(), instrument.quote()) {
            ("EUR", "USD") => (1.08, 1.10),
            ("GBP", "USD") => (1.26, 1.28),
            ("AUD", "USD") => (0.65, 0.67),
            ("NZD", "USD") => (0.60, 0.62),
            ("USD", "CHF") => (0.88, 0.90),
            ("USD", "CAD") => (1.35, 1.37),
            (_, "JPY") => (140.0, 160.0),
            _ => (1.0, 1.5),
        },
    }
}

/// Max relative step of the random walk.
fn walk_band(category: AssetCategory) -> f64 {
    match category {
        AssetCategory::Forex | AssetCategory::Metals => 0.001,
        AssetCategory::Crypto => 0.005,
    }
}

/// Max absolute percent change reported.
fn change_band(category: AssetCategory) -> f64 {
    match category {
        AssetCategory::Forex | AssetCategory::Metals => 2.0,
        AssetCategory::Crypto => 5.0,
    }
}

fn price_decimals(instrument: &InstrumentId, price: f64) -> i32 {
    match instrument.category() {
        AssetCategory::Forex if instrument.quote() == "JPY" => 3,
        AssetCategory::Forex => 5,
        AssetCategory::Metals => 2,
        AssetCategory::Crypto if price < 10.0 => 4,
        AssetCategory::Crypto => 2,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
