use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

/// A cached value with its absolute expiry.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Read-only snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct CacheStats {
    /// Lookups answered from a fresh entry.
    pub hits: u64,
    /// Lookups that found nothing or only a stale entry.
    pub misses: u64,
    /// Entries currently held, including not-yet-purged stale ones.
    pub size: usize,
}

/// Process-local key/value cache with per-entry expiry.
///
/// Expiry is absolute: reading an entry never extends its lifetime. Stale
/// entries are evicted lazily on `get` and in bulk by [`TtlCache::purge_expired`]
/// (which [`TtlCache::spawn_sweeper`] calls on an interval).
///
/// [`TtlCache::get_or_set`] is not single-flight: concurrent misses for the same
/// key may each run the factory, and the last writer wins.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The TTL applied when `set` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the value for `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let fresh = self
            .entries
            .get(key)
            .and_then(|entry| (now < entry.expires_at).then(|| entry.value.clone()));

        match fresh {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                // Only evict if still stale; a concurrent `set` may have refreshed it.
                self.entries
                    .remove_if(key, |_, entry| now >= entry.expires_at);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any existing entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.set_at(key.into(), value, ttl, Instant::now());
    }

    fn set_at(&self, key: String, value: V, ttl: Option<Duration>, now: Instant) {
        let expires_at = now + ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove a single key. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove every key matching a glob where `*` matches any run of characters.
    ///
    /// Returns the number of entries removed.
    pub fn delete_pattern(&self, pattern: &str) -> usize {
        let re = match glob_to_regex(pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(pattern, error = %e, "Ignoring unusable cache invalidation pattern");
                return 0;
            }
        };

        let mut removed = 0;
        self.entries.retain(|key, _| {
            if re.is_match(key) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Return the cached value, or run `factory`, cache its output and return it.
    ///
    /// Factory errors are returned as-is and nothing is cached.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        factory: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = factory().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.len(),
        }
    }

    /// Spawn a background task that purges expired entries every `every`.
    ///
    /// The task holds only a weak reference and exits once the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!(removed, "Purged expired cache entries");
                }
            }
        })
    }
}

/// Translate a `*` glob into an anchored regex; all other characters match literally.
fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
}
