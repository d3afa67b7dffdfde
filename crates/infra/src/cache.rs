//! Time-boxed cache for the full product listing.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Five minutes.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// What writes do to the listing cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Writes leave the cache alone. Readers of the cached listing may see
    /// data up to one TTL old after a mutation.
    #[default]
    Legacy,
    /// Every successful write clears the cache.
    InvalidateOnWrite,
}

impl CachePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CachePolicy::Legacy => "legacy",
            CachePolicy::InvalidateOnWrite => "invalidate-on-write",
        }
    }

    pub fn invalidates_on_write(self) -> bool {
        matches!(self, CachePolicy::InvalidateOnWrite)
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cache policy '{0}' (expected 'legacy' or 'invalidate-on-write')")]
pub struct UnknownCachePolicy(pub String);

impl FromStr for CachePolicy {
    type Err = UnknownCachePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(CachePolicy::Legacy),
            "invalidate-on-write" | "invalidate_on_write" => Ok(CachePolicy::InvalidateOnWrite),
            other => Err(UnknownCachePolicy(other.to_string())),
        }
    }
}

#[derive(Debug)]
struct Entry<T> {
    items: Arc<Vec<T>>,
    fetched_at: Instant,
}

#[derive(Debug)]
struct Slot<T> {
    entry: Option<Entry<T>>,
    generation: u64,
}

/// Generation of the cache at the moment a fetch started.
///
/// [`ListingCache::invalidate`] bumps the generation, so a fetch that began
/// before an invalidation can no longer install its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket(u64);

/// One cached list plus the instant it was fetched.
///
/// The lock is never held across an `.await`: callers take a
/// [`ticket`](Self::ticket), check, fetch without the lock, then `store`.
/// Two concurrent misses both fetch; the last one to store wins unless an
/// invalidation happened in between, in which case neither result is kept.
#[derive(Debug)]
pub struct ListingCache<T> {
    ttl: Duration,
    slot: Mutex<Slot<T>>,
}

impl<T> ListingCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(Slot {
                entry: None,
                generation: 0,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // Fields are replaced wholesale, so a poisoned lock still holds a
        // consistent slot.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ticket(&self) -> CacheTicket {
        CacheTicket(self.lock().generation)
    }

    /// The cached list while it is younger than the TTL.
    pub fn get(&self) -> Option<Arc<Vec<T>>> {
        let guard = self.lock();
        let entry = guard.entry.as_ref()?;
        (entry.fetched_at.elapsed() < self.ttl).then(|| Arc::clone(&entry.items))
    }

    /// Replace the cached list and restart the TTL, unless the cache was
    /// invalidated after `ticket` was taken. The list is returned either way.
    pub fn store(&self, ticket: CacheTicket, items: Vec<T>) -> Arc<Vec<T>> {
        let items = Arc::new(items);
        let mut guard = self.lock();
        if guard.generation == ticket.0 {
            guard.entry = Some(Entry {
                items: Arc::clone(&items),
                fetched_at: Instant::now(),
            });
        }
        items
    }

    pub fn invalidate(&self) {
        let mut guard = self.lock();
        guard.entry = None;
        guard.generation = guard.generation.wrapping_add(1);
    }

    /// Age of the cached list, fresh or not.
    pub fn age(&self) -> Option<Duration> {
        self.lock()
            .entry
            .as_ref()
            .map(|entry| entry.fetched_at.elapsed())
    }
}

impl<T> Default for ListingCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = ListingCache::new(Duration::from_secs(300));
        assert!(cache.get().is_none());

        let stored = cache.store(cache.ticket(), vec![1, 2, 3]);
        let hit = cache.get().unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get().is_none());
        assert_eq!(cache.age(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn invalidate_clears_entry() {
        let cache = ListingCache::default();
        cache.store(cache.ticket(), vec!["a"]);
        cache.invalidate();
        assert!(cache.get().is_none());
        assert_eq!(cache.age(), None);
    }

    #[test]
    fn fetch_started_before_invalidation_is_not_installed() {
        let cache = ListingCache::default();
        let stale = cache.ticket();
        cache.invalidate();

        let returned = cache.store(stale, vec!["pre-write"]);
        assert_eq!(returned.as_slice(), ["pre-write"]);
        assert!(cache.get().is_none());

        cache.store(cache.ticket(), vec!["post-write"]);
        assert_eq!(cache.get().unwrap().as_slice(), ["post-write"]);
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("legacy".parse::<CachePolicy>().unwrap(), CachePolicy::Legacy);
        assert_eq!(
            " Invalidate-On-Write ".parse::<CachePolicy>().unwrap(),
            CachePolicy::InvalidateOnWrite
        );
        assert!("sometimes".parse::<CachePolicy>().is_err());
        assert_eq!(CachePolicy::default(), CachePolicy::Legacy);
    }
}
