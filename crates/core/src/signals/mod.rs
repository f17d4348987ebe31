//! Synchronized trading signals.
//!
//! - [`model`] - directions, timeframes, keys, payloads and request/response shapes
//! - [`distribution`] - the weighted magnitude distribution
//! - [`alternation`] - per-key memory enforcing alternation and spread
//! - [`producer`] - the [`Producer`](crate::cache::Producer) for signal keys
//! - [`service`] - request validation, caching and localization

pub mod alternation;
pub mod distribution;
pub mod model;
pub mod producer;
pub mod service;


pub use alternation::AlternationEntry;
pub use distribution::{MagnitudeBand, MagnitudeDistribution};
pub use model::{
    Direction, Signal, SignalBasis, SignalCandidate, SignalKey, SignalParams, SignalPayload,
    SignalRequest, Timeframe,
};
pub use producer::SignalProducer;
pub use service::SignalService;
