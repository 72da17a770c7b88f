//! Keyed query cache.
//!
//! Each [`QueryKey`] owns at most one authoritative value plus its fetch bookkeeping.
//! Readers always see a whole value: a re-fetch swaps the `Arc` in one step, so a list is
//! never observed half-updated. Every state change bumps a version on a watch channel.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

/// Identity of a cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full feed, newest first.
    AllPosts,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::AllPosts => "posts.getAll",
        }
    }
}

/// What happened to an invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// No fetch was running; the caller must start a re-fetch.
    Started,
    /// A re-fetch issued for an earlier invalidation is still running and covers this one.
    Absorbed,
    /// The first load is still running and may predate this invalidation; one re-fetch
    /// follows when it lands.
    Deferred,
}

/// What a reader sees for one key.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub value: Option<Arc<T>>,
    pub error: Option<String>,
    pub stale: bool,
    pub in_flight: bool,
    /// Whether any fetch was ever started for this key.
    pub requested: bool,
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            error: self.error.clone(),
            stale: self.stale,
            in_flight: self.in_flight,
            requested: self.requested,
        }
    }
}

#[derive(Debug)]
struct Entry<T> {
    value: Option<Arc<T>>,
    error: Option<String>,
    stale: bool,
    in_flight: bool,
    requested: bool,
    /// The running fetch was started by an invalidation.
    refreshing: bool,
    /// An invalidation arrived during a fetch that cannot cover it.
    refetch_pending: bool,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            stale: false,
            in_flight: false,
            requested: false,
            refreshing: false,
            refetch_pending: false,
        }
    }
}

/// Store of query results keyed by [`QueryKey`].
#[derive(Debug)]
pub struct QueryCache<T> {
    entries: Mutex<HashMap<QueryKey, Entry<T>>>,
    version: watch::Sender<u64>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            entries: Mutex::new(HashMap::new()),
            version,
        }
    }

    pub fn snapshot(&self, key: QueryKey) -> QuerySnapshot<T> {
        let entries = self.entries.lock();
        match entries.get(&key) {
            Some(entry) => QuerySnapshot {
                value: entry.value.clone(),
                error: entry.error.clone(),
                stale: entry.stale,
                in_flight: entry.in_flight,
                requested: entry.requested,
            },
            None => QuerySnapshot {
                value: None,
                error: None,
                stale: false,
                in_flight: false,
                requested: false,
            },
        }
    }

    /// Claim the fetch slot for a key that was never requested.
    ///
    /// Returns `false` once any fetch was started; the caller must not start another.
    pub fn begin_first_fetch(&self, key: QueryKey) -> bool {
        let claimed = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key).or_default();
            if entry.requested {
                false
            } else {
                entry.in_flight = true;
                entry.requested = true;
                entry.refreshing = false;
                true
            }
        };
        if claimed {
            self.bump();
        }
        claimed
    }

    /// Mark the value for `key` stale. The value itself stays readable until a re-fetch
    /// replaces it.
    ///
    /// On [`Invalidation::Started`] the fetch slot is claimed for the caller.
    pub fn invalidate(&self, key: QueryKey) -> Invalidation {
        let outcome = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key).or_default();
            entry.stale = true;
            if !entry.in_flight {
                entry.in_flight = true;
                entry.requested = true;
                entry.refreshing = true;
                Invalidation::Started
            } else if entry.refreshing {
                Invalidation::Absorbed
            } else {
                entry.refetch_pending = true;
                Invalidation::Deferred
            }
        };
        self.bump();
        outcome
    }

    /// Store a fetch result and release the fetch slot.
    ///
    /// A failure keeps any previous value and records the error next to it. Returns `true`
    /// when a deferred invalidation claimed the slot again; the caller must then fetch once
    /// more.
    pub fn complete(&self, key: QueryKey, result: Result<T, String>) -> bool {
        let refetch = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key).or_default();
            match result {
                Ok(value) => {
                    entry.value = Some(Arc::new(value));
                    entry.error = None;
                    entry.stale = entry.refetch_pending;
                }
                Err(err) => {
                    entry.error = Some(err);
                }
            }

            let refetch = entry.refetch_pending;
            entry.refetch_pending = false;
            entry.in_flight = refetch;
            entry.refreshing = refetch;
            refetch
        };
        self.bump();
        refetch
    }

    /// Receiver that changes whenever any entry changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let snap = cache.snapshot(QueryKey::AllPosts);
        assert!(snap.value.is_none());
        assert!(!snap.in_flight);
        assert!(!snap.requested);
    }

    #[test]
    fn test_first_fetch_is_claimed_once() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        assert!(cache.begin_first_fetch(QueryKey::AllPosts));
        assert!(!cache.begin_first_fetch(QueryKey::AllPosts));

        assert!(!cache.complete(QueryKey::AllPosts, Ok(vec![1, 2])));
        assert!(!cache.begin_first_fetch(QueryKey::AllPosts));
        assert!(!cache.snapshot(QueryKey::AllPosts).in_flight);
    }

    #[test]
    fn test_invalidations_during_refetch_are_absorbed() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        cache.begin_first_fetch(QueryKey::AllPosts);
        cache.complete(QueryKey::AllPosts, Ok(vec![1]));

        assert_eq!(cache.invalidate(QueryKey::AllPosts), Invalidation::Started);
        assert_eq!(cache.invalidate(QueryKey::AllPosts), Invalidation::Absorbed);
        assert!(!cache.complete(QueryKey::AllPosts, Ok(vec![2, 1])));

        let snap = cache.snapshot(QueryKey::AllPosts);
        assert!(!snap.stale);
        assert!(!snap.in_flight);
    }

    #[test]
    fn test_invalidation_during_first_load_refetches_once() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        cache.begin_first_fetch(QueryKey::AllPosts);

        assert_eq!(cache.invalidate(QueryKey::AllPosts), Invalidation::Deferred);
        assert_eq!(cache.invalidate(QueryKey::AllPosts), Invalidation::Deferred);

        // The first load lands with data from before the invalidation.
        assert!(cache.complete(QueryKey::AllPosts, Ok(vec![1])));
        let snap = cache.snapshot(QueryKey::AllPosts);
        assert!(snap.stale);
        assert!(snap.in_flight);
        assert_eq!(*snap.value.unwrap(), vec![1]);

        // The follow-up absorbs further invalidations and settles.
        assert_eq!(cache.invalidate(QueryKey::AllPosts), Invalidation::Absorbed);
        assert!(!cache.complete(QueryKey::AllPosts, Ok(vec![2, 1])));
        let snap = cache.snapshot(QueryKey::AllPosts);
        assert!(!snap.stale);
        assert!(!snap.in_flight);
        assert_eq!(*snap.value.unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_stale_value_stays_readable() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        cache.begin_first_fetch(QueryKey::AllPosts);
        cache.complete(QueryKey::AllPosts, Ok(vec![1, 2]));

        cache.invalidate(QueryKey::AllPosts);
        let snap = cache.snapshot(QueryKey::AllPosts);
        assert!(snap.stale);
        assert_eq!(*snap.value.unwrap(), vec![1, 2]);

        cache.complete(QueryKey::AllPosts, Ok(vec![3, 1, 2]));
        let snap = cache.snapshot(QueryKey::AllPosts);
        assert!(!snap.stale);
        assert_eq!(*snap.value.unwrap(), vec![3, 1, 2]);
    }

    #[test]
    fn test_failure_keeps_previous_value() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        cache.begin_first_fetch(QueryKey::AllPosts);
        cache.complete(QueryKey::AllPosts, Ok(vec![1]));

        cache.invalidate(QueryKey::AllPosts);
        cache.complete(QueryKey::AllPosts, Err("boom".to_string()));

        let snap = cache.snapshot(QueryKey::AllPosts);
        assert_eq!(*snap.value.unwrap(), vec![1]);
        assert_eq!(snap.error.as_deref(), Some("boom"));
        assert!(!snap.in_flight);
    }

    #[test]
    fn test_changes_bump_version() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let rx = cache.subscribe();
        let before = *rx.borrow();

        cache.begin_first_fetch(QueryKey::AllPosts);
        cache.complete(QueryKey::AllPosts, Ok(vec![]));
        assert!(*rx.borrow() > before);
        assert!(rx.has_changed().unwrap());
    }
}
