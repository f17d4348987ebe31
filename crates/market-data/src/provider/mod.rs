//! Upstream client abstractions and implementations.
//!
//! This module contains:
//! - The `UpstreamClient` trait that all providers implement
//! - A local token bucket that guards the provider's request quota
//! - The Finnhub client and the placeholder used when it is not configured
//!
//! Clients never retry. A failed call is reported as a typed
//! [`UpstreamError`](crate::errors::UpstreamError) and the caller decides
//! whether to fall back.

mod rate_limiter;
mod traits;
mod unconfigured;

pub mod finnhub;

// Re-exports
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use traits::UpstreamClient;
pub use unconfigured::UnconfiguredClient;
