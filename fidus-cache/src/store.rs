//! Keyed store with single-flight reads.
//!
//! Each cache slot is either a completed result (`Ready`) or an in-flight
//! fetch (`InFlight`). Readers that arrive while a fetch is in flight
//! subscribe to its broadcast channel instead of issuing a second request,
//! so concurrent identical reads collapse to one network call and every
//! caller observes the same resolved result.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};

use crate::config::CacheConfig;
use crate::error::QueryError;

/// Bound for cache key types: a resource tag plus identifying parameters,
/// compared structurally.
pub trait CacheKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Counters exposed for tests and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a fresh `Ready` entry.
    pub hits: u64,
    /// Reads that became the leader of a fetch.
    pub misses: u64,
    /// Reads that joined an already in-flight fetch.
    pub coalesced: u64,
    /// Entries dropped through `invalidate`.
    pub invalidations: u64,
    /// Values installed through `put`.
    pub puts: u64,
}

#[derive(Debug, Clone)]
struct CachedEntry {
    value: Value,
    cached_at: DateTime<Utc>,
}

enum Slot {
    Ready(CachedEntry),
    InFlight(broadcast::Sender<Result<Value, QueryError>>),
}

struct Inner<K> {
    slots: HashMap<K, Slot>,
    stats: CacheStats,
}

/// Process-wide query cache. Construct once, share via `Arc`.
pub struct QueryCache<K: CacheKey> {
    inner: Mutex<Inner<K>>,
    config: CacheConfig,
}

impl<K: CacheKey> QueryCache<K> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                stats: CacheStats::default(),
            }),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Read the value for `key`, running `fetch` only when no fresh value
    /// is cached and no identical read is already in flight.
    ///
    /// The first caller for a key becomes the leader: it runs `fetch`,
    /// stores the result and broadcasts it. Later callers arriving before
    /// the leader finishes subscribe to that broadcast and never touch the
    /// network. A failed fetch leaves no entry behind, so the next read
    /// retries.
    pub async fn get_with<F, Fut>(&self, key: K, fetch: F) -> Result<Value, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, QueryError>>,
    {
        let tx = {
            let mut inner = self.inner.lock().await;

            if let Some(Slot::Ready(entry)) = inner.slots.get(&key) {
                if !is_expired(entry, self.config.entry_ttl) {
                    let value = entry.value.clone();
                    inner.stats.hits += 1;
                    return Ok(value);
                }
            }

            if let Some(Slot::InFlight(tx)) = inner.slots.get(&key) {
                let mut rx = tx.subscribe();
                inner.stats.coalesced += 1;
                drop(inner);
                return match rx.recv().await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(QueryError::interrupted()),
                };
            }

            let (tx, _rx) = broadcast::channel(1);
            inner.slots.insert(key.clone(), Slot::InFlight(tx.clone()));
            inner.stats.misses += 1;
            tx
        };

        let outcome = fetch().await;

        {
            let mut inner = self.inner.lock().await;
            match &outcome {
                Ok(value) => {
                    inner.slots.insert(
                        key,
                        Slot::Ready(CachedEntry {
                            value: value.clone(),
                            cached_at: Utc::now(),
                        }),
                    );
                }
                Err(_) => {
                    // A put may have installed a fresh value while this
                    // fetch was failing; only clear our own flight marker.
                    if matches!(inner.slots.get(&key), Some(Slot::InFlight(_))) {
                        inner.slots.remove(&key);
                    }
                }
            }
        }

        let _ = tx.send(outcome.clone());
        outcome
    }

    /// Install a value for `key` immediately, replacing whatever is there.
    ///
    /// Used after a successful write to keep the cache warm with the
    /// server-returned object. Last write wins; a fetch completing after
    /// this put may overwrite it, which callers accept for idempotent reads.
    pub async fn put(&self, key: K, value: Value) {
        let mut inner = self.inner.lock().await;
        inner.slots.insert(
            key,
            Slot::Ready(CachedEntry {
                value,
                cached_at: Utc::now(),
            }),
        );
        inner.stats.puts += 1;
    }

    /// Drop the entry for `key`, forcing the next read to refetch.
    /// Returns whether an entry was present.
    pub async fn invalidate(&self, key: &K) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = inner.slots.remove(key).is_some();
        if removed {
            inner.stats.invalidations += 1;
        }
        removed
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.slots.clear();
    }

    /// Current value of a `Ready` entry, ignoring freshness. Primarily for
    /// tests asserting on cache contents.
    pub async fn peek(&self, key: &K) -> Option<Value> {
        let inner = self.inner.lock().await;
        match inner.slots.get(key) {
            Some(Slot::Ready(entry)) => Some(entry.value.clone()),
            _ => None,
        }
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn is_expired(entry: &CachedEntry, ttl: Duration) -> bool {
    let age = Utc::now()
        .signed_duration_since(entry.cached_at)
        .to_std()
        .unwrap_or(Duration::ZERO);
    age > ttl
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: Value,
    ) -> impl Future<Output = Result<Value, QueryError>> {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache: QueryCache<&'static str> = QueryCache::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_with("assets", || counting_fetch(&calls, json!([1, 2])))
            .await
            .unwrap();
        let second = cache
            .get_with("assets", || counting_fetch(&calls, json!([3])))
            .await
            .unwrap();

        assert_eq!(first, json!([1, 2]));
        assert_eq!(second, json!([1, 2]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_fetch() {
        let cache: Arc<QueryCache<&'static str>> = Arc::new(QueryCache::with_defaults());
        let calls = Arc::new(AtomicUsize::new(0));

        let slow_fetch = || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(json!(["equity", "bond"]))
            }
        };

        let (a, b) = tokio::join!(
            cache.get_with("assets", slow_fetch),
            cache.get_with("assets", slow_fetch),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.coalesced, 1);
    }

    #[tokio::test]
    async fn test_coalesced_reader_sees_leader_error() {
        let cache: Arc<QueryCache<&'static str>> = Arc::new(QueryCache::with_defaults());

        let failing = || async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err(QueryError::with_status(503, "backend unavailable"))
        };

        let (a, b) = tokio::join!(
            cache.get_with("clients", failing),
            cache.get_with("clients", failing),
        );

        assert_eq!(a.unwrap_err().message, "backend unavailable");
        assert_eq!(b.unwrap_err().status, Some(503));

        // The failed flight leaves no entry; the next read fetches again.
        assert!(cache.is_empty().await);
        let calls = Arc::new(AtomicUsize::new(0));
        cache
            .get_with("clients", || counting_fetch(&calls, json!([])))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache: QueryCache<&'static str> = QueryCache::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_with("clients", || counting_fetch(&calls, json!(["a"])))
            .await
            .unwrap();
        assert!(cache.invalidate(&"clients").await);

        let after = cache
            .get_with("clients", || counting_fetch(&calls, json!(["a", "b"])))
            .await
            .unwrap();
        assert_eq!(after, json!(["a", "b"]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().await.invalidations, 1);
    }

    #[tokio::test]
    async fn test_invalidate_missing_key_is_noop() {
        let cache: QueryCache<&'static str> = QueryCache::with_defaults();
        assert!(!cache.invalidate(&"clients").await);
        assert_eq!(cache.stats().await.invalidations, 0);
    }

    #[tokio::test]
    async fn test_put_replaces_without_fetch() {
        let cache: QueryCache<&'static str> = QueryCache::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_with("client:1", || counting_fetch(&calls, json!({"name": "old"})))
            .await
            .unwrap();

        cache.put("client:1", json!({"name": "new"})).await;
        assert_eq!(
            cache.peek(&"client:1").await,
            Some(json!({"name": "new"}))
        );

        // The put value satisfies the next read; no extra fetch happens.
        let read = cache
            .get_with("client:1", || counting_fetch(&calls, json!({"name": "x"})))
            .await
            .unwrap();
        assert_eq!(read, json!({"name": "new"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let cache: QueryCache<&'static str> =
            QueryCache::new(CacheConfig::new().with_ttl(Duration::ZERO));
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_with("assets", || counting_fetch(&calls, json!([1])))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache
            .get_with("assets", || counting_fetch(&calls, json!([2])))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().await.misses, 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_share_flights() {
        let cache: Arc<QueryCache<String>> = Arc::new(QueryCache::with_defaults());
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch_for = |value: Value| {
            let calls = Arc::clone(&calls);
            move || {
                let calls = Arc::clone(&calls);
                let value = value.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(value)
                }
            }
        };

        let (a, b) = tokio::join!(
            cache.get_with("allocations:c1".to_string(), fetch_for(json!(["x"]))),
            cache.get_with("allocations:c2".to_string(), fetch_for(json!(["y"]))),
        );

        assert_eq!(a.unwrap(), json!(["x"]));
        assert_eq!(b.unwrap(), json!(["y"]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_empties_the_store() {
        let cache: QueryCache<&'static str> = QueryCache::with_defaults();
        cache.put("assets", json!([])).await;
        cache.put("clients", json!([])).await;
        assert_eq!(cache.len().await, 2);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
