//! Upstream client trait definitions.
//!
//! This module defines the `UpstreamClient` trait, the single I/O boundary
//! between the caches and the external quote/analysis provider.

use async_trait::async_trait;

use crate::errors::UpstreamError;
use crate::models::{InstrumentId, Resolution, TechnicalAnalysis, UpstreamQuote};

/// Trait for upstream quote/analysis providers.
///
/// Implementations translate an instrument into the provider's addressing
/// scheme, issue exactly one request and translate the response. They never
/// retry: retry and fallback policy belongs to the caller.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tradesync_market_data::provider::UpstreamClient;
///
/// struct StaticClient;
///
/// #[async_trait]
/// impl UpstreamClient for StaticClient {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     async fn latest_quote(&self, instrument: &InstrumentId) -> Result<UpstreamQuote, UpstreamError> {
///         // ...
///     }
///
///     // ... implement technical_analysis
/// }
/// ```
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Unique identifier for this provider ("FINNHUB", ...).
    ///
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Whether the client has what it needs to reach the provider.
    ///
    /// Default is `true`; placeholder clients return `false`.
    fn is_configured(&self) -> bool {
        true
    }

    /// Fetch the latest quote for an instrument.
    async fn latest_quote(&self, instrument: &InstrumentId)
        -> Result<UpstreamQuote, UpstreamError>;

    /// Fetch the aggregate technical indicator scan for an instrument.
    ///
    /// # Arguments
    ///
    /// * `instrument` - The instrument to analyze
    /// * `resolution` - Candle resolution the indicators are computed on
    async fn technical_analysis(
        &self,
        instrument: &InstrumentId,
        resolution: Resolution,
    ) -> Result<TechnicalAnalysis, UpstreamError>;
}
