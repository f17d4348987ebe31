//! Local request quota for one upstream client.
//!
//! Finnhub enforces a per-minute quota. The client takes a permit here before
//! every request and fails fast with `RateLimited` when none is left, so a
//! refused request never eats into the caller's upstream timeout.

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use log::{debug, warn};

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    /// Permits available after an idle period; lets a full quote board burst.
    pub burst_capacity: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst_capacity: 30.0,
        }
    }
}

#[derive(Debug)]
struct Permits {
    available: f64,
    refilled_at: Instant,
    per_second: f64,
    capacity: f64,
}

impl Permits {
    fn full(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            available: config.burst_capacity,
            refilled_at: now,
            per_second: f64::from(config.requests_per_minute) / 60.0,
            capacity: config.burst_capacity,
        }
    }

    fn refill(&mut self, now: Instant) {
        let idle = now.saturating_duration_since(self.refilled_at).as_secs_f64();
        self.available = (self.available + idle * self.per_second).min(self.capacity);
        self.refilled_at = now;
    }

    fn take(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.available < 1.0 {
            return false;
        }
        self.available -= 1.0;
        true
    }
}

pub struct RateLimiter {
    permits: Mutex<Permits>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            permits: Mutex::new(Permits::full(&config, Instant::now())),
        }
    }

    fn permits(&self) -> MutexGuard<'_, Permits> {
        self.permits.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Takes one permit if available. Never waits.
    pub fn try_acquire(&self) -> bool {
        let granted = self.permits().take(Instant::now());
        if !granted {
            debug!("Upstream quota exhausted, refusing request locally");
        }
        granted
    }

    pub fn remaining(&self) -> f64 {
        let mut permits = self.permits();
        permits.refill(Instant::now());
        permits.available
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
