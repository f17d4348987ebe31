use std::sync::Arc;

use log::debug;
use tradesync_market_data::InstrumentId;

use super::model::{Direction, Signal, SignalKey, SignalParams, SignalPayload, SignalRequest, Timeframe};
use super::producer::SignalProducer;
use crate::cache::{CachePolicy, ResultCache};
use crate::errors::{Result, ValidationError};
use crate::language::Language;
use crate::utils::Clock;

/// Serves synchronized signals: every caller of one (instrument, timeframe)
/// within a window receives the same id, direction and probability.
pub struct SignalService {
    cache: ResultCache<SignalProducer>,
}

impl SignalService {
    pub fn new(producer: SignalProducer, clock: Arc<dyn Clock>, policy: CachePolicy) -> Self {
        Self {
            cache: ResultCache::new(Arc::new(producer), clock, policy),
        }
    }

    pub fn cache(&self) -> &ResultCache<SignalProducer> {
        &self.cache
    }

    pub async fn generate(&self, request: SignalRequest) -> Result<Signal> {
        let (key, params) = validate(&request)?;
        debug!(
            "Signal requested for {} {} (floor {:?})",
            key.instrument, key.timeframe, params.floor
        );

        let produced = self.cache.get_or_produce(key, params).await;

        Ok(Signal {
            id: produced.payload.id.clone(),
            direction: produced.payload.direction,
            probability: produced.payload.magnitude,
            reason: localized_reason(&produced.payload, request.lang),
            instrument: request.instrument,
            timeframe: request.timeframe,
            timestamp: produced.produced_at,
        })
    }

    /// Drops all cached signals and alternation history.
    pub fn reset(&self) {
        self.cache.clear();
    }
}

fn validate(request: &SignalRequest) -> Result<(SignalKey, SignalParams)> {
    let instrument = request.instrument.trim();
    if instrument.is_empty() {
        return Err(ValidationError::MissingField("instrument".to_string()).into());
    }

    let timeframe = request.timeframe.trim();
    if timeframe.is_empty() {
        return Err(ValidationError::MissingField("timeframe".to_string()).into());
    }

    let instrument: InstrumentId = instrument.parse()?;
    let timeframe: Timeframe = timeframe.parse()?;

    let floor = match request.min_probability {
        None => None,
        Some(p) if p.is_finite() => Some(p.floor().clamp(0.0, 100.0) as u8),
        Some(_) => {
            return Err(ValidationError::InvalidInput(
                "minProbability must be a finite number".to_string(),
            )
            .into())
        }
    };

    Ok((SignalKey::new(instrument, timeframe), SignalParams { floor }))
}

fn localized_reason(payload: &SignalPayload, lang: Language) -> String {
    match lang {
        Language::En => payload.rationale.clone(),
        Language::Ru => match payload.direction {
            Direction::Buy => "Технический анализ указывает на рост".to_string(),
            Direction::Sell => "Технический анализ указывает на снижение".to_string(),
        },
    }
}
