//! Market data models
//!
//! This module contains the core data types for upstream operations:
//! - `types` - Type aliases for common identifiers (Currency, ProviderSymbol)
//! - `instrument` - Canonical instrument identity (InstrumentId) and AssetCategory enum
//! - `quote` - Latest quote as returned by a provider (UpstreamQuote)
//! - `analysis` - Indicator scan results (TechnicalAnalysis) and candle Resolution

mod analysis;
mod instrument;
mod quote;
mod types;

pub use analysis::{AnalysisVerdict, Resolution, TechnicalAnalysis};
pub use instrument::{strip_flags, AssetCategory, InstrumentId, Metal, ParseInstrumentError};
pub use quote::UpstreamQuote;
pub use types::{Currency, ProviderSymbol};
