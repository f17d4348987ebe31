use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tradesync_market_data::{UpstreamClient, UpstreamError};

use super::model::{QuoteKey, QuotePayload, QuoteState};
use crate::cache::{Producer, ResultSource};
use crate::fallback::FallbackGenerator;

/// Produces quotes from the upstream, or as a random walk from the last
/// known price.
pub struct QuoteProducer {
    client: Arc<dyn UpstreamClient>,
    fallback: FallbackGenerator,
    rng: Mutex<StdRng>,
}

impl QuoteProducer {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self::with_rng(client, StdRng::from_entropy())
    }

    pub fn with_rng(client: Arc<dyn UpstreamClient>, rng: StdRng) -> Self {
        Self {
            client,
            fallback: FallbackGenerator,
            rng: Mutex::new(rng),
        }
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| {
            warn!("Quote RNG mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl Producer for QuoteProducer {
    type Key = QuoteKey;
    type Candidate = QuotePayload;
    type Payload = QuotePayload;
    type Params = ();
    type State = QuoteState;

    fn name(&self) -> &'static str {
        self.client.id()
    }

    async fn fetch(&self, key: &QuoteKey, _params: &()) -> Result<QuotePayload, UpstreamError> {
        let quote = self.client.latest_quote(&key.instrument).await?;
        let payload = QuotePayload {
            price: quote.price,
            change_percent: quote.change_percent,
            source: ResultSource::Upstream,
        };

        if !payload.is_publishable() {
            return Err(UpstreamError::Malformed {
                provider: self.client.id().to_string(),
                message: format!("unusable quote for {}: {}", key.instrument, quote.price),
            });
        }
        Ok(payload)
    }

    fn fallback(&self, key: &QuoteKey, _params: &(), state: &QuoteState) -> QuotePayload {
        self.fallback
            .quote(&key.instrument, state.last_price, &mut *self.lock_rng())
    }

    fn settle(
        &self,
        _key: &QuoteKey,
        payload: QuotePayload,
        _params: &(),
        state: &mut QuoteState,
    ) -> QuotePayload {
        if payload.is_publishable() {
            state.last_price = Some(payload.price);
        }
        payload
    }
}
