use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;
use tradesync_market_data::UpstreamError;

/// Knows how to produce the payload for one kind of cache key.
///
/// A production is `fetch` (bounded by the cache's upstream timeout), or
/// `fallback` when that fails, followed by `settle`, which folds the candidate
/// into the key's per-key state and returns the payload every waiter receives.
#[async_trait]
pub trait Producer: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    /// Unsettled result of a fetch or fallback.
    type Candidate: Send + 'static;
    type Payload: Clone + Debug + Send + Sync + 'static;
    /// Per-request production hints.
    type Params: Clone + Send + Sync + 'static;
    /// Per-key memory that survives across windows.
    type State: Default + Send + 'static;

    /// Provider label used in logs and timeout errors.
    fn name(&self) -> &'static str;

    async fn fetch(
        &self,
        key: &Self::Key,
        params: &Self::Params,
    ) -> Result<Self::Candidate, UpstreamError>;

    fn fallback(&self, key: &Self::Key, params: &Self::Params, state: &Self::State)
        -> Self::Candidate;

    fn settle(
        &self,
        key: &Self::Key,
        candidate: Self::Candidate,
        params: &Self::Params,
        state: &mut Self::State,
    ) -> Self::Payload;
}
