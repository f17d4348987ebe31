//! TradeSync Market Data Crate
//!
//! This crate is the upstream boundary of the TradeSync service: it knows how
//! to name an instrument in the provider's grammar, how to ask the provider for
//! a quote or an indicator scan, and how to report failure in a typed way.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   Caller input   | --> |  InstrumentId    |  (canonical identity)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | finnhub_symbol() |  (per-category grammar)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  UpstreamClient  |  (one request, no retry)
//!                          +------------------+
//!                                  |
//!                                  v
//!                 UpstreamQuote / TechnicalAnalysis / UpstreamError
//! ```
//!
//! # Core Types
//!
//! - [`InstrumentId`] - Provider-agnostic instrument identifier
//! - [`UpstreamClient`] - Trait implemented by every provider
//! - [`FinnhubClient`] - The production provider
//! - [`UnconfiguredClient`] - Placeholder used when no credentials exist
//! - [`UpstreamError`] - Timeout / RateLimited / Malformed / Unavailable

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::UpstreamError;

// Re-export all public types from models
pub use models::{
    strip_flags, AnalysisVerdict, AssetCategory, Currency, InstrumentId, Metal,
    ParseInstrumentError, ProviderSymbol, Resolution, TechnicalAnalysis,
    UpstreamQuote,
};

// Re-export provider types
pub use provider::finnhub::{finnhub_symbol, FinnhubClient, FinnhubConfig};
pub use provider::{RateLimitConfig, RateLimiter, UnconfiguredClient, UpstreamClient};
