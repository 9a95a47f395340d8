//! Keyed query cache with freshness, idle eviction, retry and in-flight coalescing.
//!
//! Every entry holds the last good value, when it was fetched, when it was last
//! asked for, and the fetch currently running for its key. Concurrent callers
//! for one key await the same spawned task, so a key is never fetched twice at
//! the same time.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::time::Instant;

/// Normalized failure of a cached query, cheap to clone into every waiter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a fetched value is served without refetching
    pub stale_time: Duration,
    /// Idle time after which an entry is evicted
    pub gc_time: Duration,
    /// Extra attempts after a failed fetch
    pub retry: u32,
    pub retry_delay: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(30),
            gc_time: Duration::from_secs(5 * 60),
            retry: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Non-blocking view of a key
#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus<V> {
    Idle,
    Loading,
    Success(V),
    Error(QueryError),
}

impl<V> QueryStatus<V> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryStatus::Loading)
    }

    pub fn data(&self) -> Option<&V> {
        match self {
            QueryStatus::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryStatus::Error(err) => Some(err),
            _ => None,
        }
    }
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, QueryError>>>;

struct Entry<V> {
    value: Option<V>,
    updated_at: Option<Instant>,
    last_error: Option<QueryError>,
    last_access: Instant,
    in_flight: Option<(u64, SharedFetch<V>)>,
}

impl<V> Entry<V> {
    fn new(now: Instant) -> Self {
        Self {
            value: None,
            updated_at: None,
            last_error: None,
            last_access: now,
            in_flight: None,
        }
    }
}

pub struct QueryCache<K, V> {
    entries: Arc<Mutex<HashMap<K, Entry<V>>>>,
    policy: CachePolicy,
    fetch_ids: Arc<AtomicU64>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            policy: self.policy,
            fetch_ids: Arc::clone(&self.fetch_ids),
        }
    }
}

fn lock<K, V>(entries: &Mutex<HashMap<K, Entry<V>>>) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            policy,
            fetch_ids: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Fresh cached value, else the result of the in-flight or a new fetch
    pub async fn fetch<F, Fut>(&self, key: K, fetcher: F) -> Result<V, QueryError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let pending = {
            let mut entries = lock(&self.entries);
            let now = Instant::now();
            self.evict_idle(&mut entries, now);

            let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));
            entry.last_access = now;

            if let (Some(value), Some(updated_at)) = (&entry.value, entry.updated_at) {
                if now.duration_since(updated_at) < self.policy.stale_time {
                    tracing::debug!("query cache hit: {:?}", key);
                    return Ok(value.clone());
                }
            }

            match &entry.in_flight {
                Some((_, shared)) => {
                    tracing::debug!("joining in-flight fetch: {:?}", key);
                    shared.clone()
                }
                None => {
                    let fetch_id = self.fetch_ids.fetch_add(1, Ordering::Relaxed);
                    let shared = self.spawn_fetch(key.clone(), fetch_id, fetcher);
                    entry.in_flight = Some((fetch_id, shared.clone()));
                    shared
                }
            }
        };

        pending.await
    }

    fn spawn_fetch<F, Fut>(&self, key: K, fetch_id: u64, fetcher: F) -> SharedFetch<V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let policy = self.policy;
        let entries = Arc::clone(&self.entries);

        tracing::debug!("query cache miss, fetching: {:?}", key);
        let task = tokio::spawn(async move {
            let result = fetch_with_retry(&fetcher, policy, &key).await;

            let mut map = lock(&entries);
            if let Some(entry) = map.get_mut(&key) {
                if matches!(&entry.in_flight, Some((id, _)) if *id == fetch_id) {
                    entry.in_flight = None;
                }
                match &result {
                    Ok(value) => {
                        entry.value = Some(value.clone());
                        entry.updated_at = Some(Instant::now());
                        entry.last_error = None;
                    }
                    Err(err) => entry.last_error = Some(err.clone()),
                }
            }
            result
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(QueryError::new(format!("fetch task failed: {}", e))))
        }
        .boxed()
        .shared()
    }

    pub fn status(&self, key: &K) -> QueryStatus<V> {
        let entries = lock(&self.entries);
        match entries.get(key) {
            None => QueryStatus::Idle,
            Some(entry) => match (&entry.value, &entry.in_flight, &entry.last_error) {
                (Some(value), _, _) => QueryStatus::Success(value.clone()),
                (None, Some(_), _) => QueryStatus::Loading,
                (None, None, Some(err)) => QueryStatus::Error(err.clone()),
                (None, None, None) => QueryStatus::Idle,
            },
        }
    }

    /// Cached value regardless of freshness
    pub fn peek(&self, key: &K) -> Option<V> {
        lock(&self.entries).get(key).and_then(|entry| entry.value.clone())
    }

    pub fn invalidate(&self, key: &K) {
        lock(&self.entries).remove(key);
    }

    /// Evict entries idle for longer than the gc time
    pub fn sweep(&self) {
        let mut entries = lock(&self.entries);
        self.evict_idle(&mut entries, Instant::now());
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_idle(&self, entries: &mut HashMap<K, Entry<V>>, now: Instant) {
        let gc_time = self.policy.gc_time;
        entries.retain(|key, entry| {
            let keep = entry.in_flight.is_some() || now.duration_since(entry.last_access) < gc_time;
            if !keep {
                tracing::debug!("evicting idle cache entry: {:?}", key);
            }
            keep
        });
    }
}

async fn fetch_with_retry<K, V, F, Fut>(fetcher: &F, policy: CachePolicy, key: &K) -> Result<V, QueryError>
where
    K: Debug,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<V, QueryError>>,
{
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.retry => {
                attempt += 1;
                tracing::warn!(
                    "fetch for {:?} failed ({}), retrying in {:?} (attempt {}/{})",
                    key,
                    err,
                    policy.retry_delay,
                    attempt,
                    policy.retry
                );
                tokio::time::sleep(policy.retry_delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
