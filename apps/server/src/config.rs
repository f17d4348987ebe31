use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use tradesync_core::constants::{
    DEFAULT_MAGNITUDE_SPREAD, DEFAULT_QUOTE_BATCH_PAUSE_MS, DEFAULT_QUOTE_BATCH_SIZE,
    DEFAULT_QUOTE_TTL_SECS, DEFAULT_SIGNAL_TTL_SECS, DEFAULT_UPSTREAM_TIMEOUT_MS,
    MAX_CACHE_TTL_SECS,
};
use tradesync_core::signals::MagnitudeDistribution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
    pub finnhub_api_key: Option<String>,
    pub finnhub_requests_per_minute: u32,
    pub upstream_timeout: Duration,
    pub signal_ttl_secs: u64,
    pub quote_ttl_secs: u64,
    pub quote_batch_size: usize,
    pub quote_batch_pause: Duration,
    pub magnitude: MagnitudeDistribution,
    pub require_upstream: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unset keys take their
    /// defaults; set but unparseable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr: SocketAddr = parse_or(&var, "TS_LISTEN_ADDR", "0.0.0.0:8080".parse()?)?;
        let cors_allow = var("TS_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = var("TS_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30000);
        let log_format = match var("TS_LOG_FORMAT") {
            None => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) => return Err(anyhow!("Invalid TS_LOG_FORMAT '{}': expected text or json", v)),
        };

        let finnhub_api_key = var("FINNHUB_API_KEY").map(|v| v.trim().to_string());
        let finnhub_requests_per_minute = parse_or(&var, "TS_FINNHUB_REQUESTS_PER_MINUTE", 60)?;
        let upstream_timeout_ms: u64 =
            parse_or(&var, "TS_UPSTREAM_TIMEOUT_MS", DEFAULT_UPSTREAM_TIMEOUT_MS)?;
        let signal_ttl_secs = parse_or(&var, "TS_SIGNAL_TTL_SECS", DEFAULT_SIGNAL_TTL_SECS)?;
        let quote_ttl_secs = parse_or(&var, "TS_QUOTE_TTL_SECS", DEFAULT_QUOTE_TTL_SECS)?;
        let quote_batch_size = parse_or(&var, "TS_QUOTE_BATCH_SIZE", DEFAULT_QUOTE_BATCH_SIZE)?;
        let quote_batch_pause_ms: u64 =
            parse_or(&var, "TS_QUOTE_BATCH_PAUSE_MS", DEFAULT_QUOTE_BATCH_PAUSE_MS)?;
        let spread: u8 = parse_or(&var, "TS_MAGNITUDE_SPREAD", DEFAULT_MAGNITUDE_SPREAD)?;
        let magnitude = match var("TS_MAGNITUDE_BANDS") {
            Some(bands) => MagnitudeDistribution::from_str(&bands)
                .map_err(|e| anyhow!("Invalid TS_MAGNITUDE_BANDS: {}", e))?,
            None => MagnitudeDistribution::default(),
        }
        .with_spread(spread);
        let require_upstream = parse_or(&var, "TS_REQUIRE_UPSTREAM", false)?;

        if quote_batch_size == 0 {
            return Err(anyhow!("TS_QUOTE_BATCH_SIZE must be at least 1"));
        }
        for (key, ttl) in [
            ("TS_SIGNAL_TTL_SECS", signal_ttl_secs),
            ("TS_QUOTE_TTL_SECS", quote_ttl_secs),
        ] {
            if ttl == 0 || ttl > MAX_CACHE_TTL_SECS {
                return Err(anyhow!(
                    "{} must be between 1 and {} seconds, got {}",
                    key,
                    MAX_CACHE_TTL_SECS,
                    ttl
                ));
            }
        }

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            log_format,
            finnhub_api_key,
            finnhub_requests_per_minute,
            upstream_timeout: Duration::from_millis(upstream_timeout_ms),
            signal_ttl_secs,
            quote_ttl_secs,
            quote_batch_size,
            quote_batch_pause: Duration::from_millis(quote_batch_pause_ms),
            magnitude,
            require_upstream,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30000),
            log_format: LogFormat::Text,
            finnhub_api_key: None,
            finnhub_requests_per_minute: 60,
            upstream_timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
            signal_ttl_secs: DEFAULT_SIGNAL_TTL_SECS,
            quote_ttl_secs: DEFAULT_QUOTE_TTL_SECS,
            quote_batch_size: DEFAULT_QUOTE_BATCH_SIZE,
            quote_batch_pause: Duration::from_millis(DEFAULT_QUOTE_BATCH_PAUSE_MS),
            magnitude: MagnitudeDistribution::default(),
            require_upstream: false,
        }
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow!("{}", e))
            .with_context(|| format!("Invalid {} '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.cors_allow, vec!["*"]);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.finnhub_api_key.is_none());
        assert_eq!(config.upstream_timeout, Duration::from_secs(4));
        assert_eq!(config.signal_ttl_secs, 30);
        assert_eq!(config.quote_ttl_secs, 5);
        assert_eq!(config.quote_batch_size, 10);
        assert_eq!(config.quote_batch_pause, Duration::from_millis(100));
        assert_eq!(config.magnitude, MagnitudeDistribution::default());
        assert!(!config.require_upstream);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("TS_CORS_ALLOW_ORIGINS", "https://a.example, https://b.example"),
            ("TS_LOG_FORMAT", "JSON"),
            ("FINNHUB_API_KEY", " abc123 "),
            ("TS_MAGNITUDE_BANDS", "55-70:40,71-92:60"),
            ("TS_MAGNITUDE_SPREAD", "5"),
            ("TS_REQUIRE_UPSTREAM", "true"),
        ])
        .unwrap();

        assert_eq!(config.cors_allow, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.finnhub_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.magnitude.min(), 55);
        assert_eq!(config.magnitude.spread(), 5);
        assert!(config.require_upstream);
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = config(&[("FINNHUB_API_KEY", "  ")]).unwrap();
        assert!(config.finnhub_api_key.is_none());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config(&[("TS_SIGNAL_TTL_SECS", "soon")]).is_err());
        assert!(config(&[("TS_MAGNITUDE_BANDS", "65-70:10")]).is_err());
        assert!(config(&[("TS_LOG_FORMAT", "xml")]).is_err());
        assert!(config(&[("TS_QUOTE_BATCH_SIZE", "0")]).is_err());
        assert!(config(&[("TS_LISTEN_ADDR", "nowhere")]).is_err());
        assert!(config(&[("TS_SIGNAL_TTL_SECS", "0")]).is_err());
        assert!(config(&[("TS_SIGNAL_TTL_SECS", "18446744073709551615")]).is_err());
        assert!(config(&[("TS_QUOTE_TTL_SECS", "9300000000000000")]).is_err());
        assert!(config(&[("TS_SIGNAL_TTL_SECS", "86400")]).is_ok());
    }

    #[test]
    fn test_request_timeout_falls_back() {
        let config = config(&[("TS_REQUEST_TIMEOUT_MS", "fast")]).unwrap();
        assert_eq!(config.request_timeout, Duration::from_millis(30000));
    }
}
