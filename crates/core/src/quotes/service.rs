use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::{debug, warn};
use tradesync_market_data::InstrumentId;

use super::batch::BatchScheduler;
use super::model::{QuoteKey, QuoteView};
use super::producer::QuoteProducer;
use crate::cache::{CachePolicy, ResultCache};
use crate::utils::Clock;

/// Serves synchronized quotes for arbitrary lists of pairs.
pub struct QuoteService {
    cache: ResultCache<QuoteProducer>,
    scheduler: BatchScheduler,
}

impl QuoteService {
    pub fn new(
        producer: QuoteProducer,
        clock: Arc<dyn Clock>,
        policy: CachePolicy,
        scheduler: BatchScheduler,
    ) -> Self {
        Self {
            cache: ResultCache::new(Arc::new(producer), clock, policy),
            scheduler,
        }
    }

    pub fn cache(&self) -> &ResultCache<QuoteProducer> {
        &self.cache
    }

    /// Latest quote per requested pair, keyed by the caller's own spelling.
    ///
    /// Unrecognized pairs and unusable payloads are left out rather than
    /// reported.
    pub async fn latest(&self, pairs: Vec<String>) -> BTreeMap<String, QuoteView> {
        let mut seen = HashSet::new();
        let requested: Vec<(String, InstrumentId)> = pairs
            .into_iter()
            .filter(|pair| seen.insert(pair.clone()))
            .filter_map(|pair| match pair.parse::<InstrumentId>() {
                Ok(instrument) => Some((pair, instrument)),
                Err(err) => {
                    warn!("Skipping quote for {}: {}", pair, err);
                    None
                }
            })
            .collect();

        debug!("Quote lookup for {} pairs", requested.len());

        let cache = &self.cache;
        let produced = self
            .scheduler
            .run(requested, move |(pair, instrument)| async move {
                let result = cache.get_or_produce(QuoteKey::new(instrument), ()).await;
                (pair, result)
            })
            .await;

        produced
            .into_iter()
            .filter(|(_, result)| result.payload.is_publishable())
            .map(|(pair, result)| (pair, QuoteView::from(&result.payload)))
            .collect()
    }

    /// Drops all cached quotes and remembered prices.
    pub fn reset(&self) {
        self.cache.clear();
    }
}
