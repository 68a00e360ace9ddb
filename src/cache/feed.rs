// In-memory TTL cache for a single upstream feed.
// Shields rate-limited APIs by memoizing the last successful fetch.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;

/// Wrapper for cached data with the time it was fetched.
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was fetched from upstream.
    pub cached_at: Instant,
}

impl<T> CachedData<T> {
    /// Create a new cached data entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
        }
    }

    /// Check if this cached data has expired based on TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() >= ttl
    }

    /// Check if this cached data is still valid (not expired).
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }
}

/// One cache slot for one feed.
///
/// The slot lock is held across the upstream fetch, so callers that miss at
/// the same time are serialized and only the first one goes upstream. The
/// fetch time is mirrored outside that lock so `age` never waits on a fetch.
#[derive(Debug)]
pub struct FeedCache<T> {
    name: &'static str,
    ttl: Duration,
    slot: Mutex<Option<CachedData<T>>>,
    fetched_at: std::sync::Mutex<Option<Instant>>,
}

impl<T: Clone> FeedCache<T> {
    /// Create an empty cache for the named feed.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            slot: Mutex::new(None),
            fetched_at: std::sync::Mutex::new(None),
        }
    }

    /// Return the cached value if still live, otherwise run `fetch` and store its result.
    ///
    /// A failed fetch leaves the previous entry and its timestamp untouched.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref().filter(|c| c.is_valid(self.ttl)) {
            tracing::debug!(feed = self.name, "cache hit");
            return Ok(cached.data.clone());
        }

        tracing::debug!(feed = self.name, "cache miss, fetching upstream");
        match fetch().await {
            Ok(data) => {
                let cached = CachedData::new(data.clone());
                *self.stamp() = Some(cached.cached_at);
                *slot = Some(cached);
                Ok(data)
            }
            Err(e) => {
                tracing::warn!(feed = self.name, error = %e, "upstream fetch failed");
                Err(e)
            }
        }
    }

    /// Age of the stored entry, live or not. `None` before the first successful fetch.
    ///
    /// Does not wait for a fetch in flight; it reports the entry that is stored now.
    pub fn age(&self) -> Option<Duration> {
        (*self.stamp()).map(|at| at.elapsed())
    }

    fn stamp(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.fetched_at.lock().unwrap_or_else(|e| e.into_inner())
    }
}
