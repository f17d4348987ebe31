//! TradeSync Core - synchronized signal and quote caches.
//!
//! Every viewer of the same instrument (and timeframe, for signals) sees an
//! identical result for a bounded window, whatever the upstream is doing.
//! Upstream failures never reach callers: they degrade to synthetic payloads.
//!
//! # Architecture
//!
//! ```text
//! SignalService / QuoteService
//!        |
//!        v
//!   ResultCache<P: Producer>  --(one ticket per key)-->  Producer::fetch
//!        |                                                    | on failure
//!        |                                                    v
//!        |                                          FallbackGenerator
//!        v
//!   Producer::settle (alternation, magnitude, last price)
//! ```

pub mod cache;
pub mod constants;
pub mod errors;
pub mod fallback;
pub mod language;
pub mod market_status;
pub mod quotes;
pub mod signals;
pub mod utils;

pub use errors::{Error, Result, ValidationError};
pub use language::Language;
pub use market_status::{market_status, MarketStatus};
