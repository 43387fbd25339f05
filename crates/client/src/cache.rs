//! Stale-while-revalidate cache for backend reads.
//!
//! A value younger than `fresh_for` is served as is. An older one is served
//! immediately while a background task refetches it. Concurrent misses for
//! the same key share a single fetch. Entries are dropped after `max_age`
//! whether or not they were refreshed.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::future::Cache;
use parking_lot::Mutex;

const DEFAULT_CAPACITY: u64 = 1000;
const DEFAULT_FRESH_FOR: Duration = Duration::from_secs(30);
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

/// Read-through cache keyed by strings.
#[derive(Clone)]
pub struct SwrCache<V> {
    entries: Cache<String, Arc<Entry<V>>>,
    refreshing: Arc<Mutex<HashSet<String>>>,
    /// Bumped by [`SwrCache::clear`]; refreshes started before it are discarded.
    generation: Arc<AtomicU64>,
    fresh_for: Duration,
}

impl<V> SwrCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Cache with a 30 second freshness window and 10 minute hard expiry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timing(DEFAULT_FRESH_FOR, DEFAULT_MAX_AGE)
    }

    #[must_use]
    pub fn with_timing(fresh_for: Duration, max_age: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(DEFAULT_CAPACITY)
            .time_to_live(max_age)
            .build();

        Self {
            entries,
            refreshing: Arc::new(Mutex::new(HashSet::new())),
            generation: Arc::new(AtomicU64::new(0)),
            fresh_for,
        }
    }

    /// Cached value for `key`, fetching on a miss.
    ///
    /// A stale hit returns the cached value and refreshes it in the
    /// background; a failed refresh keeps the stale value.
    ///
    /// # Errors
    ///
    /// Returns the fetch error on a miss. Waiters that joined the same fetch
    /// share it through an `Arc`.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: String, fetch: F) -> Result<V, Arc<E>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: std::fmt::Display + Send + Sync + 'static,
    {
        if let Some(entry) = self.entries.get(&key).await {
            if entry.fetched_at.elapsed() >= self.fresh_for {
                self.spawn_refresh(key, fetch);
            }
            return Ok(entry.value.clone());
        }

        let entry = self
            .entries
            .try_get_with(key, async move {
                let value = fetch().await?;
                Ok::<_, E>(Arc::new(Entry {
                    value,
                    fetched_at: Instant::now(),
                }))
            })
            .await?;
        Ok(entry.value.clone())
    }

    /// Drop one key.
    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Drop every key starting with `prefix`.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let keys: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect();

        for key in keys {
            self.entries.invalidate(key.as_str()).await;
        }
        tracing::debug!(prefix, "Cache prefix invalidated");
    }

    /// Drop every key. Background refreshes already in flight are discarded.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.invalidate_all();
        self.refreshing.lock().clear();
        tracing::debug!("Cache cleared");
    }

    /// Whether `key` currently has a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn spawn_refresh<F, Fut, E>(&self, key: String, fetch: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: std::fmt::Display + Send + Sync + 'static,
    {
        if !self.refreshing.lock().insert(key.clone()) {
            return;
        }

        let entries = self.entries.clone();
        let refreshing = Arc::clone(&self.refreshing);
        let generation = Arc::clone(&self.generation);
        let started = generation.load(Ordering::SeqCst);
        tokio::spawn(async move {
            match fetch().await {
                Ok(_) if generation.load(Ordering::SeqCst) != started => {
                    tracing::debug!(key = %key, "Discarding refresh from before a clear");
                    return;
                }
                Ok(value) => {
                    let entry = Arc::new(Entry {
                        value,
                        fetched_at: Instant::now(),
                    });
                    entries.insert(key.clone(), entry).await;
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "Background refresh failed"),
            }
            refreshing.lock().remove(&key);
        });
    }
}

impl<V> Default for SwrCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting_fetch(
        counter: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<u32, String>> + Send>>
    + Send
    + 'static {
        let counter = Arc::clone(counter);
        move || {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(value)
            })
        }
    }

    #[tokio::test]
    async fn test_fresh_hit_does_not_refetch() {
        let cache = SwrCache::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_fetch("k".into(), counting_fetch(&calls, 1)).await;
        let second = cache.get_or_fetch("k".into(), counting_fetch(&calls, 2)).await;
        assert_eq!(first.unwrap(), 1);
        assert_eq!(second.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let cache = SwrCache::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.get_or_fetch("k".into(), counting_fetch(&calls, 1)),
            cache.get_or_fetch("k".into(), counting_fetch(&calls, 1)),
        );
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_hit_serves_old_value_then_refreshes() {
        let cache = SwrCache::<u32>::with_timing(Duration::ZERO, Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k".into(), counting_fetch(&calls, 1)).await.unwrap();
        let stale = cache.get_or_fetch("k".into(), counting_fetch(&calls, 2)).await;
        assert_eq!(stale.unwrap(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let refreshed = cache.entries.get("k").await.unwrap();
        assert_eq!(refreshed.value, 2);
    }

    #[tokio::test]
    async fn test_miss_error_is_returned_and_not_cached() {
        let cache = SwrCache::<u32>::new();
        let err = cache
            .get_or_fetch("k".into(), || async { Err::<u32, _>("Not logged in".to_owned()) })
            .await
            .unwrap_err();
        assert_eq!(err.as_str(), "Not logged in");
        assert!(!cache.contains("k"));
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache = SwrCache::<u32>::new();
        for key in ["products:1", "products:2", "categories:all"] {
            cache
                .get_or_fetch(key.into(), || async { Ok::<_, String>(0) })
                .await
                .unwrap();
        }

        cache.invalidate_prefix("products:").await;
        assert!(!cache.contains("products:1"));
        assert!(!cache.contains("products:2"));
        assert!(cache.contains("categories:all"));

        cache.invalidate("categories:all").await;
        assert!(!cache.contains("categories:all"));
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = SwrCache::<u32>::new();
        for key in ["users:list", "products:1"] {
            cache
                .get_or_fetch(key.into(), || async { Ok::<_, String>(0) })
                .await
                .unwrap();
        }

        cache.clear();
        assert!(!cache.contains("users:list"));
        assert!(!cache.contains("products:1"));
    }

    #[tokio::test]
    async fn test_clear_discards_refresh_in_flight() {
        let cache = SwrCache::<u32>::with_timing(Duration::ZERO, Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k".into(), counting_fetch(&calls, 1)).await.unwrap();
        // Stale hit starts a 20ms refresh.
        cache.get_or_fetch("k".into(), counting_fetch(&calls, 2)).await.unwrap();
        cache.clear();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.contains("k"));
    }
}
