//! Synchronized quotes.
//!
//! - [`model`] - quote keys, payloads, per-key state and the caller view
//! - [`batch`] - the paced [`BatchScheduler`]
//! - [`producer`] - the [`Producer`](crate::cache::Producer) for quote keys
//! - [`service`] - de-duplication, parsing and batched lookup

pub mod batch;
pub mod model;
pub mod producer;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use batch::BatchScheduler;
pub use model::{QuoteKey, QuotePayload, QuoteState, QuoteView};
pub use producer::QuoteProducer;
pub use service::QuoteService;
