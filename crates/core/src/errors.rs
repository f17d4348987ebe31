//! Core error types for TradeSync.
//!
//! Upstream failures are deliberately absent here: the result caches recover
//! from every [`UpstreamError`](tradesync_market_data::UpstreamError) by
//! producing a fallback payload, so only caller mistakes and configuration
//! problems ever reach this type.

use thiserror::Error;
use tradesync_market_data::ParseInstrumentError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core services.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller-supplied request has the wrong shape.
    #[error("{0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    Config(String),
}

/// Validation errors for caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported timeframe: '{0}'")]
    UnknownTimeframe(String),

    #[error(transparent)]
    UnknownInstrument(#[from] ParseInstrumentError),
}

impl From<ParseInstrumentError> for Error {
    fn from(err: ParseInstrumentError) -> Self {
        Error::InvalidRequest(ValidationError::UnknownInstrument(err))
    }
}

impl Error {
    /// Returns `true` for errors caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }
}
