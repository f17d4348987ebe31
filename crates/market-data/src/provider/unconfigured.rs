//! Placeholder client used when no upstream credentials are configured.

use async_trait::async_trait;

use crate::errors::UpstreamError;
use crate::models::{InstrumentId, Resolution, TechnicalAnalysis, UpstreamQuote};
use crate::provider::UpstreamClient;

const PROVIDER_ID: &str = "UNCONFIGURED";

/// Client that fails every call with [`UpstreamError::Unavailable`].
///
/// Lets the service start without an API key; every production then goes
/// through the fallback generator.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredClient {
    reason: String,
}

impl UnconfiguredClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable(&self) -> UpstreamError {
        UpstreamError::Unavailable {
            provider: PROVIDER_ID.to_string(),
            reason: self.reason.clone(),
        }
    }
}

#[async_trait]
impl UpstreamClient for UnconfiguredClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn latest_quote(&self, _: &InstrumentId) -> Result<UpstreamQuote, UpstreamError> {
        Err(self.unavailable())
    }

    async fn technical_analysis(
        &self,
        _: &InstrumentId,
        _: Resolution,
    ) -> Result<TechnicalAnalysis, UpstreamError> {
        Err(self.unavailable())
    }
}
