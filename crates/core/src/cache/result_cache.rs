//! Keyed, time-bounded, request-coalescing cache.
//!
//! Each key owns a slot and a per-key state. A slot is either a ready result
//! or a pending production ticket (a [`Shared`] future). The first caller that
//! finds the slot stale installs a ticket; every caller arriving before the
//! ticket resolves awaits that same ticket, so one production serves the whole
//! window. Shard guards are released before any await.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, error, info, warn};
use tradesync_market_data::UpstreamError;

use super::model::{CachePolicy, CachedResult, ResultSource};
use super::producer::Producer;
use crate::utils::Clock;

/// Result type stored and returned by a cache driven by `P`.
pub type ProducedResult<P> = CachedResult<<P as Producer>::Key, <P as Producer>::Payload>;

type Ticket<P> = Shared<BoxFuture<'static, ProducedResult<P>>>;

enum Slot<P: Producer> {
    Ready(ProducedResult<P>),
    Pending { ticket_id: u64, ticket: Ticket<P> },
}

struct KeyEntry<P: Producer> {
    slot: Option<Slot<P>>,
    state: Arc<Mutex<P::State>>,
}

impl<P: Producer> KeyEntry<P> {
    fn new() -> Self {
        Self {
            slot: None,
            state: Arc::new(Mutex::new(P::State::default())),
        }
    }
}

pub struct ResultCache<P: Producer> {
    producer: Arc<P>,
    entries: Arc<DashMap<P::Key, KeyEntry<P>>>,
    clock: Arc<dyn Clock>,
    policy: CachePolicy,
    next_ticket: AtomicU64,
}

impl<P: Producer> ResultCache<P> {
    pub fn new(producer: Arc<P>, clock: Arc<dyn Clock>, policy: CachePolicy) -> Self {
        Self {
            producer,
            entries: Arc::new(DashMap::new()),
            clock,
            policy,
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Returns the authoritative result for `key`, producing one if the
    /// current window has ended. Never fails: upstream errors become fallback
    /// payloads.
    pub async fn get_or_produce(&self, key: P::Key, params: P::Params) -> ProducedResult<P> {
        let now = self.clock.now();

        let ticket = {
            let mut entry = self.entries.entry(key.clone()).or_insert_with(KeyEntry::new);
            let in_flight = match &entry.slot {
                Some(Slot::Ready(result)) if result.is_fresh(now) => {
                    debug!("{} cache hit for {:?}", self.producer.name(), key);
                    return result.clone();
                }
                Some(Slot::Pending { ticket, .. }) => Some(ticket.clone()),
                _ => None,
            };

            match in_flight {
                Some(ticket) => {
                    debug!(
                        "{} joining in-flight production for {:?}",
                        self.producer.name(),
                        key
                    );
                    ticket
                }
                None => {
                    let ticket_id = self.next_ticket.fetch_add(1, Ordering::Relaxed);
                    let state = Arc::clone(&entry.state);
                    let ticket = self
                        .production(key, params, state, ticket_id)
                        .boxed()
                        .shared();
                    entry.slot = Some(Slot::Pending {
                        ticket_id,
                        ticket: ticket.clone(),
                    });
                    ticket
                }
            }
        };

        ticket.await
    }

    /// Returns the fresh result for `key` without producing one.
    pub fn peek(&self, key: &P::Key) -> Option<ProducedResult<P>> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        match &entry.slot {
            Some(Slot::Ready(result)) if result.is_fresh(now) => Some(result.clone()),
            _ => None,
        }
    }

    /// Drops every cached result and all per-key state.
    ///
    /// Productions already in flight still resolve for their waiters but are
    /// not written back.
    pub fn clear(&self) {
        self.entries.clear();
        info!("{} cache cleared", self.producer.name());
    }

    /// Number of keys with a slot or state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn production(
        &self,
        key: P::Key,
        params: P::Params,
        state: Arc<Mutex<P::State>>,
        ticket_id: u64,
    ) -> impl Future<Output = ProducedResult<P>> + Send + 'static {
        let producer = Arc::clone(&self.producer);
        let entries = Arc::clone(&self.entries);
        let clock = Arc::clone(&self.clock);
        let policy = self.policy;

        async move {
            let produced = AssertUnwindSafe(produce(&*producer, &key, &params, &state, policy))
                .catch_unwind()
                .await;

            let (payload, source) = match produced {
                Ok(settled) => settled,
                Err(_) => {
                    error!(
                        "{} production for {:?} panicked, serving fallback",
                        producer.name(),
                        key
                    );
                    let recovered = panic::catch_unwind(AssertUnwindSafe(|| {
                        let candidate = producer.fallback(&key, &params, &lock_state(&state));
                        producer.settle(&key, candidate, &params, &mut lock_state(&state))
                    }));
                    match recovered {
                        Ok(payload) => (payload, ResultSource::Fallback),
                        Err(cause) => {
                            // Leave the key empty so the next caller starts over.
                            release_ticket(&entries, &key, ticket_id);
                            panic::resume_unwind(cause)
                        }
                    }
                }
            };

            let result = CachedResult::new(key, payload, clock.now(), policy.ttl);

            if let Some(mut entry) = entries.get_mut(&result.key) {
                if holds_ticket(&entry, ticket_id) {
                    entry.slot = Some(Slot::Ready(result.clone()));
                }
            }

            info!(
                "{} produced {:?} from {} (valid until {})",
                producer.name(),
                result.key,
                source.as_str(),
                result.expires_at
            );
            result
        }
    }
}

/// Fetches under the upstream timeout, falls back on failure and settles the
/// candidate against the key's state.
async fn produce<P: Producer>(
    producer: &P,
    key: &P::Key,
    params: &P::Params,
    state: &Mutex<P::State>,
    policy: CachePolicy,
) -> (P::Payload, ResultSource) {
    let fetched = match tokio::time::timeout(policy.upstream_timeout, producer.fetch(key, params))
        .await
    {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout {
            provider: producer.name().to_string(),
        }),
    };

    let (candidate, source) = match fetched {
        Ok(candidate) => (candidate, ResultSource::Upstream),
        Err(err) => {
            if err.is_transient() {
                info!(
                    "{} upstream {} for {:?}, falling back: {}",
                    producer.name(),
                    err.kind(),
                    key,
                    err
                );
            } else {
                warn!(
                    "{} upstream {} for {:?}, falling back: {}",
                    producer.name(),
                    err.kind(),
                    key,
                    err
                );
            }
            let candidate = producer.fallback(key, params, &lock_state(state));
            (candidate, ResultSource::Fallback)
        }
    };

    let payload = producer.settle(key, candidate, params, &mut lock_state(state));
    (payload, source)
}

fn holds_ticket<P: Producer>(entry: &KeyEntry<P>, ticket_id: u64) -> bool {
    matches!(
        &entry.slot,
        Some(Slot::Pending { ticket_id: id, .. }) if *id == ticket_id
    )
}

fn release_ticket<P: Producer>(
    entries: &DashMap<P::Key, KeyEntry<P>>,
    key: &P::Key,
    ticket_id: u64,
) {
    if let Some(mut entry) = entries.get_mut(key) {
        if holds_ticket(&entry, ticket_id) {
            entry.slot = None;
        }
    }
}

/// Lock per-key state, recovering from poison.
fn lock_state<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(|poisoned| {
        warn!("Per-key state mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}
