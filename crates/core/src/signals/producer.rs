use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tradesync_market_data::{AnalysisVerdict, TechnicalAnalysis, UpstreamClient, UpstreamError};

use super::alternation::AlternationEntry;
use super::distribution::MagnitudeDistribution;
use super::model::{Direction, SignalBasis, SignalCandidate, SignalKey, SignalParams, SignalPayload};
use crate::cache::{Producer, ResultSource};
use crate::constants::SIGNAL_ID_LEN;
use crate::fallback::FallbackGenerator;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Produces signals from the upstream indicator scan, or synthetically.
pub struct SignalProducer {
    client: Arc<dyn UpstreamClient>,
    distribution: MagnitudeDistribution,
    fallback: FallbackGenerator,
    rng: Mutex<StdRng>,
}

impl SignalProducer {
    pub fn new(client: Arc<dyn UpstreamClient>, distribution: MagnitudeDistribution) -> Self {
        Self::with_rng(client, distribution, StdRng::from_entropy())
    }

    /// Uses a caller-supplied RNG, e.g. a seeded one for reproducible runs.
    pub fn with_rng(
        client: Arc<dyn UpstreamClient>,
        distribution: MagnitudeDistribution,
        rng: StdRng,
    ) -> Self {
        Self {
            client,
            distribution,
            fallback: FallbackGenerator,
            rng: Mutex::new(rng),
        }
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| {
            warn!("Signal RNG mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// Direction suggested by the scan; `None` when the votes are balanced.
fn scan_direction(analysis: &TechnicalAnalysis) -> Option<Direction> {
    match analysis.verdict {
        AnalysisVerdict::StrongBuy | AnalysisVerdict::Buy => Some(Direction::Buy),
        AnalysisVerdict::StrongSell | AnalysisVerdict::Sell => Some(Direction::Sell),
        AnalysisVerdict::Neutral => match analysis.buy_votes.cmp(&analysis.sell_votes) {
            Ordering::Greater => Some(Direction::Buy),
            Ordering::Less => Some(Direction::Sell),
            Ordering::Equal => None,
        },
    }
}

fn rationale(basis: &SignalBasis, direction: Direction) -> String {
    match basis {
        SignalBasis::Indicators { buy, sell, total } => {
            let (movement, votes) = match direction {
                Direction::Buy => ("upward", buy),
                Direction::Sell => ("downward", sell),
            };
            format!(
                "Technical analysis indicates {} movement ({} of {} indicators)",
                movement, votes, total
            )
        }
        SignalBasis::Heuristic(text) => text.to_string(),
    }
}

fn mint_id<R: Rng>(rng: &mut R) -> String {
    (0..SIGNAL_ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[async_trait]
impl Producer for SignalProducer {
    type Key = SignalKey;
    type Candidate = SignalCandidate;
    type Payload = SignalPayload;
    type Params = SignalParams;
    type State = AlternationEntry;

    fn name(&self) -> &'static str {
        self.client.id()
    }

    async fn fetch(
        &self,
        key: &SignalKey,
        _params: &SignalParams,
    ) -> Result<SignalCandidate, UpstreamError> {
        let analysis = self
            .client
            .technical_analysis(&key.instrument, key.timeframe.resolution())
            .await?;

        Ok(SignalCandidate {
            direction: scan_direction(&analysis),
            basis: SignalBasis::Indicators {
                buy: analysis.buy_votes,
                sell: analysis.sell_votes,
                total: analysis.total_votes(),
            },
            source: ResultSource::Upstream,
        })
    }

    fn fallback(
        &self,
        _key: &SignalKey,
        _params: &SignalParams,
        _state: &AlternationEntry,
    ) -> SignalCandidate {
        let signal = self.fallback.signal(&mut *self.lock_rng());
        SignalCandidate {
            direction: Some(signal.direction),
            basis: SignalBasis::Heuristic(signal.rationale),
            source: ResultSource::Fallback,
        }
    }

    fn settle(
        &self,
        _key: &SignalKey,
        candidate: SignalCandidate,
        params: &SignalParams,
        state: &mut AlternationEntry,
    ) -> SignalPayload {
        let mut rng = self.lock_rng();

        // Balanced evidence continues the alternation.
        let proposed = match candidate.direction {
            Some(direction) => direction,
            None => match state.last_direction {
                Some(last) => last.opposite(),
                None => {
                    if rng.gen_bool(0.5) {
                        Direction::Buy
                    } else {
                        Direction::Sell
                    }
                }
            },
        };

        let (direction, magnitude) =
            state.advance(proposed, params.floor, &self.distribution, &mut *rng);

        SignalPayload {
            id: mint_id(&mut *rng),
            direction,
            magnitude,
            rationale: rationale(&candidate.basis, direction),
            source: candidate.source,
        }
    }
}
