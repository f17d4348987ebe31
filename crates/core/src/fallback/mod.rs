//! Synthetic payloads used whenever the upstream cannot be used.

mod fallback_generator;

pub use fallback_generator::{FallbackGenerator, FallbackSignal, FALLBACK_RATIONALES};
