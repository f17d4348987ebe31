//! Tests for QuoteService batching, coalescing and degradation.

#[cfg(test)]
mod tests {
    use crate::cache::{CachePolicy, ResultSource};
    use crate::quotes::{BatchScheduler, QuoteKey, QuoteProducer, QuoteService};
    use crate::utils::ManualClock;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration as StdDuration;
    use tradesync_market_data::{
        InstrumentId, Resolution, TechnicalAnalysis, UpstreamClient, UpstreamError, UpstreamQuote,
    };

    // =========================================================================
    // Stub upstream
    // =========================================================================

    /// Answers with a fixed price per canonical pair; unknown pairs fail.
    #[derive(Default)]
    struct PriceBoard {
        prices: Mutex<HashMap<String, f64>>,
        calls: AtomicUsize,
    }

    impl PriceBoard {
        fn with(prices: &[(&str, f64)]) -> Self {
            let board = Self::default();
            for (pair, price) in prices {
                board.set(pair, *price);
            }
            board
        }

        fn set(&self, pair: &str, price: f64) {
            self.prices.lock().unwrap().insert(pair.to_string(), price);
        }

        fn clear(&self) {
            self.prices.lock().unwrap().clear();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UpstreamClient for PriceBoard {
        fn id(&self) -> &'static str {
            "BOARD"
        }

        async fn latest_quote(
            &self,
            instrument: &InstrumentId,
        ) -> Result<UpstreamQuote, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let price = self.prices.lock().unwrap().get(&instrument.to_string()).copied();
            match price {
                Some(price) => Ok(UpstreamQuote {
                    price,
                    change_percent: 0.25,
                    timestamp: Utc::now(),
                    source: "BOARD".to_string(),
                }),
                None => Err(UpstreamError::RateLimited {
                    provider: "BOARD".to_string(),
                }),
            }
        }

        async fn technical_analysis(
            &self,
            _: &InstrumentId,
            _: Resolution,
        ) -> Result<TechnicalAnalysis, UpstreamError> {
            Err(UpstreamError::Unavailable {
                provider: "BOARD".to_string(),
                reason: "not stubbed".to_string(),
            })
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 7, 14, 0, 0).unwrap(),
        ))
    }

    fn service(board: Arc<PriceBoard>, clock: Arc<ManualClock>) -> QuoteService {
        QuoteService::new(
            QuoteProducer::with_rng(board, StdRng::seed_from_u64(77)),
            clock,
            CachePolicy::quotes(),
            BatchScheduler::default(),
        )
    }

    fn pairs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    #[tokio::test]
    async fn test_quotes_keyed_by_caller_spelling() {
        let board = Arc::new(PriceBoard::with(&[("EUR/USD", 1.0871), ("BTC/USDT", 97_250.5)]));
        let svc = service(board.clone(), clock());

        let quotes = svc
            .latest(pairs(&["🇪🇺🇺🇸 EUR/USD", "BTC/USDT", "EURUSD"]))
            .await;

        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes["🇪🇺🇺🇸 EUR/USD"].price, 1.0871);
        assert_eq!(quotes["EURUSD"].price, 1.0871);
        assert_eq!(quotes["BTC/USDT"].price, 97_250.5);
        assert_eq!(quotes["BTC/USDT"].change, 0.25);
        // Two spellings of one pair share a production.
        assert_eq!(board.calls(), 2);
    }

    #[tokio::test]
    async fn test_duplicates_and_garbage_are_dropped() {
        let board = Arc::new(PriceBoard::with(&[("GBP/USD", 1.27)]));
        let svc = service(board.clone(), clock());

        let quotes = svc
            .latest(pairs(&["GBP/USD", "GBP/USD", "???", "", "GBP/USD"]))
            .await;

        assert_eq!(quotes.len(), 1);
        assert!(quotes.contains_key("GBP/USD"));
        assert_eq!(board.calls(), 1);
    }

    #[tokio::test]
    async fn test_window_serves_cached_price() {
        let clock = clock();
        let board = Arc::new(PriceBoard::with(&[("USD/JPY", 151.2)]));
        let svc = service(board.clone(), clock.clone());

        svc.latest(pairs(&["USD/JPY"])).await;
        board.set("USD/JPY", 152.0);

        clock.advance(Duration::seconds(4));
        let cached = svc.latest(pairs(&["USD/JPY"])).await;
        assert_eq!(cached["USD/JPY"].price, 151.2);

        clock.advance(Duration::seconds(1));
        let fresh = svc.latest(pairs(&["USD/JPY"])).await;
        assert_eq!(fresh["USD/JPY"].price, 152.0);
        assert_eq!(board.calls(), 2);
    }

    // =========================================================================
    // Degradation
    // =========================================================================

    #[tokio::test]
    async fn test_failed_pair_falls_back_without_affecting_siblings() {
        let board = Arc::new(PriceBoard::with(&[("EUR/USD", 1.0871)]));
        let svc = service(board.clone(), clock());

        let quotes = svc.latest(pairs(&["EUR/USD", "GOLD"])).await;

        assert_eq!(quotes["EUR/USD"].price, 1.0871);
        let gold = quotes["GOLD"];
        assert!((2650.0..=2700.0).contains(&gold.price));
        assert!(gold.change.abs() <= 2.0);

        let key = QuoteKey::new("GOLD".parse().unwrap());
        let cached = svc.cache().peek(&key).unwrap();
        assert_eq!(cached.payload.source, ResultSource::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_walks_from_last_real_price() {
        let clock = clock();
        let board = Arc::new(PriceBoard::with(&[("ETH/USDT", 3000.0)]));
        let svc = service(board.clone(), clock.clone());

        svc.latest(pairs(&["ETH/USDT"])).await;
        board.clear();

        for _ in 0..5 {
            clock.advance(Duration::seconds(5));
            let quotes = svc.latest(pairs(&["ETH/USDT"])).await;
            let price = quotes["ETH/USDT"].price;
            // Each step moves at most 0.5%; five steps stay well inside 3%.
            assert!((price - 3000.0).abs() < 90.0, "{}", price);
        }
        assert_eq!(board.calls(), 6);
    }

    #[tokio::test]
    async fn test_non_positive_upstream_price_is_replaced() {
        let board = Arc::new(PriceBoard::with(&[("EUR/USD", 0.0)]));
        let svc = service(board.clone(), clock());

        let quotes = svc.latest(pairs(&["EUR/USD"])).await;
        let quote = quotes["EUR/USD"];
        assert!(quote.price > 0.0);
        assert!((1.08..=1.10).contains(&quote.price));
    }

    // =========================================================================
    // Pacing
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_large_board_is_paced_in_batches() {
        let board = Arc::new(PriceBoard::default());
        let svc = QuoteService::new(
            QuoteProducer::with_rng(board.clone(), StdRng::seed_from_u64(1)),
            clock(),
            CachePolicy::quotes(),
            BatchScheduler::new(10, StdDuration::from_millis(100)),
        );

        let currencies = [
            "EUR", "GBP", "AUD", "NZD", "CAD", "CHF", "JPY", "SEK", "NOK", "DKK", "PLN", "CZK",
            "HUF", "TRY", "MXN", "ZAR", "SGD", "HKD", "CNY", "INR", "BRL", "KRW", "THB", "ILS",
            "RUB",
        ];
        let list: Vec<String> = currencies.iter().map(|c| format!("{}/AED", c)).collect();

        let started = tokio::time::Instant::now();
        let quotes = svc.latest(list).await;

        assert_eq!(quotes.len(), 25);
        assert_eq!(board.calls(), 25);
        assert_eq!(started.elapsed(), StdDuration::from_millis(200));
    }
}
