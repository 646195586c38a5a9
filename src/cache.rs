//! Keyed asynchronous query cache.
//!
//! Each key holds either a settled value or one in-flight fetch. Concurrent
//! callers asking for a key that is already being fetched await the same
//! fetch instead of issuing their own. Settled values are served until their
//! stale time passes; failures are retried with exponential backoff and are
//! never stored. Settled values nobody asked for within the gc time after
//! going stale are dropped the next time a key misses.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{QueryError, is_retryable};

/// Upper bound for the delay between two attempts
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Per-query caching and retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a settled value is served without refetching
    pub stale_time: Duration,

    /// Extra attempts after the first failure
    pub max_retries: u32,

    /// Delay before the first retry; doubles per attempt up to [`MAX_RETRY_DELAY`]
    pub retry_base_delay: Duration,

    /// How long a stale value is kept before it is dropped
    pub gc_time: Duration,
}

pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

impl QueryOptions {
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }
}

/// Delay before retry number `attempt` (zero based)
pub fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_RETRY_DELAY)
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, QueryError>>>;

enum Slot<V> {
    Ready {
        value: V,
        fetched_at: Instant,
        expires_at: Instant,
    },
    InFlight { generation: u64, fetch: SharedFetch<V> },
}

struct Slots<K, V> {
    entries: HashMap<K, Slot<V>>,
    next_generation: u64,
}

impl<K, V> Slots<K, V> {
    /// Remove settled values past their gc deadline; running fetches stay
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, slot| match slot {
            Slot::Ready { expires_at, .. } => *expires_at > now,
            Slot::InFlight { .. } => true,
        });
        before - self.entries.len()
    }
}

enum Lookup<V> {
    Fresh(V),
    Pending(u64, SharedFetch<V>),
    Miss,
}

/// Counters describing how requests were served
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicUsize,
    pub misses: AtomicUsize,
    pub coalesced: AtomicUsize,
}

impl CacheStats {
    pub fn summary(&self) -> String {
        format!(
            "hits: {}, misses: {}, coalesced: {}",
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.coalesced.load(Ordering::Relaxed)
        )
    }
}

pub struct QueryCache<K, V> {
    slots: Mutex<Slots<K, V>>,
    stats: CacheStats,
}

impl<K, V> Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                next_generation: 0,
            }),
            stats: CacheStats::default(),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for `key`, running `producer` only when nothing fresh
    /// is cached and no fetch for the key is already running
    pub async fn get<F, Fut>(
        &self,
        key: K,
        options: QueryOptions,
        producer: F,
    ) -> Result<V, QueryError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let (generation, fetch) = {
            let mut slots = self.slots.lock().await;

            let lookup = match slots.entries.get(&key) {
                Some(Slot::Ready {
                    value, fetched_at, ..
                }) if fetched_at.elapsed() < options.stale_time =>
                {
                    Lookup::Fresh(value.clone())
                }
                Some(Slot::InFlight { generation, fetch }) => {
                    Lookup::Pending(*generation, fetch.clone())
                }
                _ => Lookup::Miss,
            };

            match lookup {
                Lookup::Fresh(value) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(?key, "Query cache hit");
                    return Ok(value);
                }
                Lookup::Pending(generation, fetch) => {
                    self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(?key, "Joining in-flight query");
                    (generation, fetch)
                }
                Lookup::Miss => {
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    debug!(?key, "Query cache miss");
                    let dropped = slots.sweep(Instant::now());
                    if dropped > 0 {
                        debug!(
                            "Dropped {} expired queries ({})",
                            dropped,
                            self.stats.summary()
                        );
                    }
                    let generation = slots.next_generation;
                    slots.next_generation += 1;
                    let fetch = run_with_retries(producer, options).boxed().shared();
                    slots.entries.insert(
                        key.clone(),
                        Slot::InFlight {
                            generation,
                            fetch: fetch.clone(),
                        },
                    );
                    (generation, fetch)
                }
            }
        };

        let outcome = fetch.await;
        self.settle(&key, generation, &outcome, options).await;
        outcome
    }

    /// Cached value for `key` regardless of staleness, without fetching
    pub async fn peek(&self, key: &K) -> Option<V> {
        let slots = self.slots.lock().await;
        match slots.entries.get(key) {
            Some(Slot::Ready { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    /// Drop the entry for `key`; a fetch still running for it will not be stored
    pub async fn invalidate(&self, key: &K) -> bool {
        let removed = self.slots.lock().await.entries.remove(key).is_some();
        if removed {
            debug!(?key, "Invalidated query");
        }
        removed
    }

    /// Drop every entry whose key matches `predicate`
    pub async fn invalidate_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&K) -> bool,
    {
        let mut slots = self.slots.lock().await;
        let before = slots.entries.len();
        slots.entries.retain(|key, _| !predicate(key));
        before - slots.entries.len()
    }

    pub async fn clear(&self) {
        self.slots.lock().await.entries.clear();
    }

    /// Number of keys with a settled value or a running fetch
    pub async fn len(&self) -> usize {
        self.slots.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    async fn settle(
        &self,
        key: &K,
        generation: u64,
        outcome: &Result<V, QueryError>,
        options: QueryOptions,
    ) {
        let mut slots = self.slots.lock().await;

        // Only the fetch that currently owns the slot may settle it
        let owns_slot = matches!(
            slots.entries.get(key),
            Some(Slot::InFlight { generation: g, .. }) if *g == generation
        );
        if !owns_slot {
            return;
        }

        match outcome {
            Ok(value) => {
                let fetched_at = Instant::now();
                slots.entries.insert(
                    key.clone(),
                    Slot::Ready {
                        value: value.clone(),
                        fetched_at,
                        expires_at: fetched_at + options.stale_time + options.gc_time,
                    },
                );
            }
            Err(_) => {
                slots.entries.remove(key);
            }
        }
    }
}

async fn run_with_retries<F, Fut, V>(producer: F, options: QueryOptions) -> Result<V, QueryError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<V>>,
{
    let mut attempt = 0;
    loop {
        match producer().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < options.max_retries && is_retryable(&err) => {
                let delay = retry_delay(options.retry_base_delay, attempt);
                attempt += 1;
                warn!(
                    "Query attempt {}/{} failed: {:#}; retrying in {:?}",
                    attempt,
                    options.max_retries + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                warn!("Query failed after {} attempt(s): {:#}", attempt + 1, err);
                return Err(QueryError::new(err));
            }
        }
    }
}
