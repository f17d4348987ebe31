//! Synchronized result cache.
//!
//! - [`model`] - cached results, timing policy and result sources
//! - [`producer`] - the [`Producer`] trait a cache is generic over
//! - [`result_cache`] - the coalescing [`ResultCache`] itself

pub mod model;
pub mod producer;
pub mod result_cache;


pub use model::{CachePolicy, CachedResult, ResultSource};
pub use producer::Producer;
pub use result_cache::{ProducedResult, ResultCache};
