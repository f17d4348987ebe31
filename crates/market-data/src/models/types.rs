use std::borrow::Cow;

/// Currency or asset code (ISO 4217 for fiat, ticker for crypto)
pub type Currency = Cow<'static, str>;

/// Provider-specific symbol, e.g. `OANDA:EUR_USD`
pub type ProviderSymbol = String;
