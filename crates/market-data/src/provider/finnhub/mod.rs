//! Finnhub upstream client implementation.
//!
//! This module provides market data from the Finnhub API:
//! - Latest quotes via the /quote endpoint
//! - Aggregate indicator scans via the /scan/technical-indicator endpoint
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

mod symbols;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::UpstreamError;
use crate::models::{AnalysisVerdict, InstrumentId, Resolution, TechnicalAnalysis, UpstreamQuote};
use crate::provider::{RateLimitConfig, RateLimiter, UpstreamClient};

pub use symbols::finnhub_symbol;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

/// Upper bound on indicator votes in one scan; Finnhub aggregates a few dozen.
const MAX_INDICATOR_VOTES: u64 = 1_000;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Percent change
    dp: Option<f64>,
    /// Timestamp (Unix)
    t: Option<i64>,
    // Note: d (change), h, l, o, pc exist but are not used
}

/// Response from /scan/technical-indicator endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndicatorScanResponse {
    technical_analysis: Option<IndicatorSummary>,
    trend: Option<TrendSummary>,
}

#[derive(Debug, Deserialize)]
struct IndicatorSummary {
    count: IndicatorCount,
    signal: String,
}

#[derive(Debug, Deserialize)]
struct IndicatorCount {
    #[serde(default)]
    buy: u32,
    #[serde(default)]
    neutral: u32,
    #[serde(default)]
    sell: u32,
}

#[derive(Debug, Deserialize)]
struct TrendSummary {
    trending: Option<bool>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubClient
// ============================================================================

/// Finnhub client settings.
#[derive(Clone, Debug)]
pub struct FinnhubConfig {
    pub api_key: String,
    pub base_url: String,
    /// Transport-level timeout; callers usually enforce a tighter one.
    pub request_timeout: Duration,
    pub rate_limit: RateLimitConfig,
}

impl FinnhubConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Finnhub upstream client.
///
/// Covers forex (OANDA), crypto (BINANCE) and the precious metals.
pub struct FinnhubClient {
    client: Client,
    config: FinnhubConfig,
    limiter: RateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with the given API key and default settings.
    pub fn new(api_key: String) -> Self {
        Self::with_config(FinnhubConfig::new(api_key))
    }

    pub fn with_config(config: FinnhubConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        let limiter = RateLimiter::new(config.rate_limit.clone());

        Self {
            client,
            config,
            limiter,
        }
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, UpstreamError> {
        if !self.limiter.try_acquire() {
            debug!(
                "Finnhub local quota exhausted ({:.2} tokens left), skipping {}",
                self.limiter.remaining(),
                endpoint
            );
            return Err(UpstreamError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let url = format!("{}{}", self.config.base_url, endpoint);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            // API key as header rather than query param
            .header("X-Finnhub-Token", &self.config.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    UpstreamError::Unavailable {
                        provider: PROVIDER_ID.to_string(),
                        reason: format!("Request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = status_error(status, &body);
            warn!("Finnhub {} answered {}: {}", endpoint, status, error);
            return Err(error);
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                UpstreamError::Malformed {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Failed to read response: {}", e),
                }
            }
        })
    }
}

// ============================================================================
// UpstreamClient Implementation
// ============================================================================

#[async_trait]
impl UpstreamClient for FinnhubClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn latest_quote(&self, instrument: &InstrumentId) -> Result<UpstreamQuote, UpstreamError> {
        let symbol = finnhub_symbol(instrument);

        debug!("Fetching latest quote for {} ({}) from Finnhub", instrument, symbol);

        let text = self.fetch("/quote", &[("symbol", symbol.as_str())]).await?;
        parse_quote(&text, &symbol)
    }

    async fn technical_analysis(
        &self,
        instrument: &InstrumentId,
        resolution: Resolution,
    ) -> Result<TechnicalAnalysis, UpstreamError> {
        let symbol = finnhub_symbol(instrument);

        debug!(
            "Fetching indicator scan for {} ({}) at resolution {} from Finnhub",
            instrument, symbol, resolution
        );

        let params = [("symbol", symbol.as_str()), ("resolution", resolution.as_param())];
        let text = self.fetch("/scan/technical-indicator", &params).await?;
        parse_analysis(&text, &symbol)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Map a non-success HTTP status to the upstream failure taxonomy.
fn status_error(status: StatusCode, body: &str) -> UpstreamError {
    match status {
        // 403 is what Finnhub returns once the plan's quota is exceeded
        StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN => UpstreamError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        },
        StatusCode::UNAUTHORIZED => UpstreamError::Unavailable {
            provider: PROVIDER_ID.to_string(),
            reason: "Invalid or missing API key".to_string(),
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => UpstreamError::Timeout {
            provider: PROVIDER_ID.to_string(),
        },
        _ => {
            let reason = serde_json::from_str::<ErrorResponse>(body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| format!("HTTP {}", status));
            UpstreamError::Unavailable {
                provider: PROVIDER_ID.to_string(),
                reason,
            }
        }
    }
}

fn malformed(message: String) -> UpstreamError {
    UpstreamError::Malformed {
        provider: PROVIDER_ID.to_string(),
        message,
    }
}

fn parse_quote(text: &str, symbol: &str) -> Result<UpstreamQuote, UpstreamError> {
    let response: QuoteResponse = serde_json::from_str(text)
        .map_err(|e| malformed(format!("Failed to parse quote response: {}", e)))?;

    // Finnhub returns zeros for unknown symbols instead of an error
    let price = match response.c {
        Some(c) if c.is_finite() && c > 0.0 => c,
        _ => return Err(malformed(format!("No quote data for symbol: {}", symbol))),
    };

    let timestamp = response
        .t
        .filter(|ts| *ts > 0)
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    Ok(UpstreamQuote {
        price,
        change_percent: response.dp.filter(|dp| dp.is_finite()).unwrap_or(0.0),
        timestamp,
        source: PROVIDER_ID.to_string(),
    })
}

fn parse_analysis(text: &str, symbol: &str) -> Result<TechnicalAnalysis, UpstreamError> {
    let response: IndicatorScanResponse = serde_json::from_str(text)
        .map_err(|e| malformed(format!("Failed to parse indicator scan: {}", e)))?;

    let summary = response
        .technical_analysis
        .ok_or_else(|| malformed(format!("No indicator data for symbol: {}", symbol)))?;

    let verdict = AnalysisVerdict::from_label(&summary.signal)
        .ok_or_else(|| malformed(format!("Unexpected indicator signal: {}", summary.signal)))?;

    let analysis = TechnicalAnalysis {
        verdict,
        buy_votes: summary.count.buy,
        neutral_votes: summary.count.neutral,
        sell_votes: summary.count.sell,
        trending: response.trend.and_then(|t| t.trending),
    };

    match analysis.total_votes() {
        0 => {
            return Err(malformed(format!("Empty indicator scan for symbol: {}", symbol)));
        }
        total if total > MAX_INDICATOR_VOTES => {
            return Err(malformed(format!(
                "Implausible indicator count {} for symbol: {}",
                total, symbol
            )));
        }
        _ => {}
    }

    Ok(analysis)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id() {
        let client = FinnhubClient::new("test_key".to_string());
        assert_eq!(client.id(), "FINNHUB");
        assert!(client.is_configured());
    }

    #[test]
    fn test_quote_response_parsing() {
        let json = r#"{
            "c": 1.0852,
            "d": 0.0011,
            "dp": 0.1015,
            "h": 1.0871,
            "l": 1.0833,
            "o": 1.0840,
            "pc": 1.0841,
            "t": 1704067200
        }"#;

        let quote = parse_quote(json, "OANDA:EUR_USD").unwrap();
        assert_eq!(quote.price, 1.0852);
        assert_eq!(quote.change_percent, 0.1015);
        assert_eq!(quote.timestamp.timestamp(), 1704067200);
        assert_eq!(quote.source, "FINNHUB");
    }

    #[test]
    fn test_quote_without_price_is_malformed() {
        let json = r#"{"c": 0, "d": null, "dp": null, "h": 0, "l": 0, "o": 0, "pc": 0, "t": 0}"#;
        let err = parse_quote(json, "OANDA:XXX_YYY").unwrap_err();
        assert_eq!(err.kind(), "UpstreamMalformed");

        let err = parse_quote("not json", "OANDA:EUR_USD").unwrap_err();
        assert_eq!(err.kind(), "UpstreamMalformed");
    }

    #[test]
    fn test_quote_missing_change_defaults_to_zero() {
        let quote = parse_quote(r#"{"c": 2650.5}"#, "OANDA:XAU_USD").unwrap();
        assert_eq!(quote.change_percent, 0.0);
    }

    #[test]
    fn test_indicator_scan_parsing() {
        let json = r#"{
            "technicalAnalysis": {
                "count": {"buy": 9, "neutral": 6, "sell": 2},
                "signal": "buy"
            },
            "trend": {"adx": 24.46, "trending": false}
        }"#;

        let analysis = parse_analysis(json, "BINANCE:BTCUSDT").unwrap();
        assert_eq!(analysis.verdict, AnalysisVerdict::Buy);
        assert_eq!(analysis.buy_votes, 9);
        assert_eq!(analysis.total_votes(), 17);
        assert_eq!(analysis.trending, Some(false));
    }

    #[test]
    fn test_indicator_scan_partial_data() {
        let err = parse_analysis("{}", "BINANCE:BTCUSDT").unwrap_err();
        assert_eq!(err.kind(), "UpstreamMalformed");

        let json = r#"{"technicalAnalysis": {"count": {}, "signal": "neutral"}}"#;
        let err = parse_analysis(json, "BINANCE:BTCUSDT").unwrap_err();
        assert_eq!(err.kind(), "UpstreamMalformed");

        let json = r#"{"technicalAnalysis": {"count": {"buy": 1}, "signal": "maybe"}}"#;
        assert!(parse_analysis(json, "BINANCE:BTCUSDT").is_err());
    }

    #[test]
    fn test_indicator_scan_rejects_absurd_counts() {
        let json = r#"{
            "technicalAnalysis": {
                "count": {"buy": 4294967295, "neutral": 0, "sell": 1},
                "signal": "buy"
            }
        }"#;
        let err = parse_analysis(json, "OANDA:EUR_USD").unwrap_err();
        assert_eq!(err.kind(), "UpstreamMalformed");
        assert!(err.to_string().contains("4294967296"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "").kind(),
            "UpstreamRateLimited"
        );
        assert_eq!(
            status_error(StatusCode::FORBIDDEN, "").kind(),
            "UpstreamRateLimited"
        );
        assert_eq!(
            status_error(StatusCode::UNAUTHORIZED, "").kind(),
            "UpstreamUnavailable"
        );
        assert_eq!(
            status_error(StatusCode::GATEWAY_TIMEOUT, "").kind(),
            "UpstreamTimeout"
        );

        let err = status_error(StatusCode::BAD_GATEWAY, r#"{"error": "maintenance"}"#);
        assert_eq!(err.to_string(), "Upstream unavailable: FINNHUB - maintenance");

        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_exhausted_bucket_fails_fast() {
        let mut config = FinnhubConfig::new("test_key");
        config.rate_limit = RateLimitConfig {
            requests_per_minute: 1,
            burst_capacity: 0.0,
        };
        let client = FinnhubClient::with_config(config);
        let instrument: InstrumentId = "EUR/USD".parse().unwrap();

        let err = client.latest_quote(&instrument).await.unwrap_err();
        assert_eq!(err.kind(), "UpstreamRateLimited");
    }
}
