//! Finnhub symbol grammar.
//!
//! - Forex: `EUR/USD` -> `OANDA:EUR_USD`
//! - Crypto: `BTC/USDT` -> `BINANCE:BTCUSDT`
//! - Metals: explicit overrides onto the OANDA metal pairs

use crate::models::{InstrumentId, Metal, ProviderSymbol};

/// Translate a canonical instrument into the symbol Finnhub expects.
pub fn finnhub_symbol(instrument: &InstrumentId) -> ProviderSymbol {
    match instrument {
        InstrumentId::Fx { base, quote } => format!("OANDA:{}_{}", base, quote),
        InstrumentId::Crypto { base, quote } => format!("BINANCE:{}{}", base, quote),
        InstrumentId::Metal { metal, .. } => metal_symbol(*metal).to_string(),
    }
}

fn metal_symbol(metal: Metal) -> &'static str {
    match metal {
        Metal::Gold => "OANDA:XAU_USD",
        Metal::Silver => "OANDA:XAG_USD",
        Metal::Platinum => "OANDA:XPT_USD",
        Metal::Palladium => "OANDA:XPD_USD",
    }
}
