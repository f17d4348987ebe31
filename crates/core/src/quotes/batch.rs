//! Paced, bounded-concurrency fan-out for quote lookups.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use log::debug;

use crate::constants::{DEFAULT_QUOTE_BATCH_PAUSE_MS, DEFAULT_QUOTE_BATCH_SIZE};

/// Runs lookups in consecutive batches of at most `batch_size`, concurrently
/// within a batch, sleeping `pause` between batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    batch_size: usize,
    pause: Duration,
}

impl BatchScheduler {
    pub fn new(batch_size: usize, pause: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pause,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Results come back in input order. One lookup's outcome never affects
    /// its siblings.
    pub async fn run<T, F, Fut>(&self, items: Vec<T>, lookup: F) -> Vec<Fut::Output>
    where
        F: Fn(T) -> Fut,
        Fut: Future,
    {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut remaining = items.into_iter();
        let mut batch_no = 0usize;

        loop {
            let batch: Vec<T> = remaining.by_ref().take(self.batch_size).collect();
            if batch.is_empty() {
                break;
            }

            if batch_no > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            batch_no += 1;

            debug!(
                "Running quote batch {} ({} of {} lookups)",
                batch_no,
                batch.len(),
                total
            );
            results.extend(join_all(batch.into_iter().map(&lookup)).await);
        }

        results
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(
            DEFAULT_QUOTE_BATCH_SIZE,
            Duration::from_millis(DEFAULT_QUOTE_BATCH_PAUSE_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_twenty_five_keys_make_three_paced_batches() {
        let scheduler = BatchScheduler::new(10, Duration::from_millis(100));
        let started = Instant::now();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let keys: Vec<usize> = (0..25).collect();
        let results = scheduler
            .run(keys, |key| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push((key, Instant::now()));
                    key * 2
                }
            })
            .await;

        assert_eq!(results, (0..25).map(|k| k * 2).collect::<Vec<_>>());

        let seen = seen.lock().unwrap();
        let offset = |key: usize| {
            let (_, at) = seen.iter().find(|(k, _)| *k == key).unwrap();
            at.duration_since(started)
        };
        let mut batches: Vec<Duration> = seen.iter().map(|(k, _)| offset(*k)).collect();
        batches.dedup();
        assert_eq!(
            batches,
            vec![
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::from_millis(200)
            ]
        );

        let per_batch: Vec<usize> = batches
            .iter()
            .map(|b| seen.iter().filter(|(k, _)| offset(*k) == *b).count())
            .collect();
        assert_eq!(per_batch, vec![10, 10, 5]);

        // No pause after the final batch.
        assert_eq!(started.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_never_exceeds_batch_size() {
        let scheduler = BatchScheduler::new(4, Duration::from_millis(50));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        scheduler
            .run((0..11).collect::<Vec<_>>(), |_| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .await;

        assert_eq!(peak.load(Ordering::SeqCst), 4);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_batch_has_no_pause() {
        let scheduler = BatchScheduler::default();
        let started = Instant::now();

        let results = scheduler.run(vec!["a", "b", "c"], |s| async move { s.len() }).await;

        assert_eq!(results, vec![1, 1, 1]);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results: Vec<u8> = BatchScheduler::default()
            .run(Vec::<u8>::new(), |x| async move { x })
            .await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        assert_eq!(BatchScheduler::new(0, Duration::ZERO).batch_size(), 1);
    }
}
