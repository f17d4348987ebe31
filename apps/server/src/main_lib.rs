use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tradesync_core::{
    cache::CachePolicy,
    quotes::{BatchScheduler, QuoteProducer, QuoteService},
    signals::{SignalProducer, SignalService},
    utils::{Clock, SystemClock},
};
use tradesync_market_data::{
    FinnhubClient, FinnhubConfig, RateLimitConfig, UnconfiguredClient, UpstreamClient,
};

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub signal_service: Arc<SignalService>,
    pub quote_service: Arc<QuoteService>,
    pub upstream: Arc<dyn UpstreamClient>,
    pub clock: Arc<dyn Clock>,
    /// Refuse quote requests instead of serving fallback when unconfigured.
    pub require_upstream: bool,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if format == LogFormat::Json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_upstream(config: &Config) -> Arc<dyn UpstreamClient> {
    match &config.finnhub_api_key {
        Some(key) => {
            let mut finnhub = FinnhubConfig::new(key.clone());
            finnhub.rate_limit = RateLimitConfig {
                requests_per_minute: config.finnhub_requests_per_minute,
                ..RateLimitConfig::default()
            };
            tracing::info!(
                "Upstream: Finnhub ({} requests/minute)",
                config.finnhub_requests_per_minute
            );
            Arc::new(FinnhubClient::with_config(finnhub))
        }
        None => {
            tracing::warn!("FINNHUB_API_KEY is not set; serving fallback data only");
            Arc::new(UnconfiguredClient::new("Finnhub API key not configured"))
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    build_state_with(config, build_upstream(config), Arc::new(SystemClock)).await
}

/// Builds the application state around an explicit upstream and clock.
pub async fn build_state_with(
    config: &Config,
    upstream: Arc<dyn UpstreamClient>,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<AppState>> {
    let signal_policy = CachePolicy::signals()
        .with_ttl_secs(config.signal_ttl_secs)
        .with_upstream_timeout(config.upstream_timeout);
    let quote_policy = CachePolicy::quotes()
        .with_ttl_secs(config.quote_ttl_secs)
        .with_upstream_timeout(config.upstream_timeout);

    let signal_service = Arc::new(SignalService::new(
        SignalProducer::new(upstream.clone(), config.magnitude.clone()),
        clock.clone(),
        signal_policy,
    ));

    let quote_service = Arc::new(QuoteService::new(
        QuoteProducer::new(upstream.clone()),
        clock.clone(),
        quote_policy,
        BatchScheduler::new(config.quote_batch_size, config.quote_batch_pause),
    ));

    tracing::info!(
        "Caches ready: signals {}s, quotes {}s, upstream timeout {:?}",
        config.signal_ttl_secs,
        config.quote_ttl_secs,
        config.upstream_timeout
    );

    Ok(Arc::new(AppState {
        signal_service,
        quote_service,
        upstream,
        clock,
        require_upstream: config.require_upstream,
    }))
}
