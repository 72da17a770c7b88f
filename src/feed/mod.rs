//! Feed synchronizer.
//!
//! Owns the cached "all posts" query. Fetches run on background tasks; callers never wait
//! on them inline and instead observe the cache through [`FeedSync::get_all`] or
//! [`FeedSync::subscribe`].

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::PostsApi;
use crate::cache::{Invalidation, QueryCache, QueryKey};
use crate::models::PostWithAuthor;

/// The feed as one reader sees it.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Server-ordered posts; `None` until a fetch has succeeded.
    pub posts: Option<Arc<Vec<PostWithAuthor>>>,
    /// True while no collection exists and no fetch has failed yet.
    pub loading: bool,
    /// Last fetch error, if the last fetch failed.
    pub error: Option<String>,
    /// True while a shown collection is stale and its replacement is being fetched.
    pub refreshing: bool,
}

impl FeedSnapshot {
    /// Collapse the snapshot into the three cases a renderer has to handle.
    pub fn status(&self) -> FeedStatus {
        if self.loading {
            return FeedStatus::Loading;
        }
        match (&self.posts, &self.error) {
            (Some(posts), _) => FeedStatus::Ready(posts.clone()),
            (None, Some(err)) => FeedStatus::Error(err.clone()),
            (None, None) => FeedStatus::Loading,
        }
    }
}

/// Tri-state feed status: zero posts is `Ready` with an empty list, never `Error`.
#[derive(Debug, Clone)]
pub enum FeedStatus {
    Loading,
    Error(String),
    Ready(Arc<Vec<PostWithAuthor>>),
}

/// Client-side owner of the feed cache.
#[derive(Clone)]
pub struct FeedSync {
    api: Arc<dyn PostsApi>,
    cache: Arc<QueryCache<Vec<PostWithAuthor>>>,
}

impl FeedSync {
    pub fn new(api: Arc<dyn PostsApi>) -> Self {
        Self {
            api,
            cache: Arc::new(QueryCache::new()),
        }
    }

    /// Current feed; starts the first fetch if the feed was never requested.
    pub fn get_all(&self) -> FeedSnapshot {
        self.prefetch();
        self.snapshot()
    }

    /// Start the first fetch without reading.
    pub fn prefetch(&self) {
        if self.cache.begin_first_fetch(QueryKey::AllPosts) {
            tracing::debug!("Fetching {}", QueryKey::AllPosts.as_str());
            self.spawn_fetch();
        }
    }

    /// Current feed without triggering any fetch.
    pub fn snapshot(&self) -> FeedSnapshot {
        let snap = self.cache.snapshot(QueryKey::AllPosts);
        FeedSnapshot {
            loading: snap.value.is_none() && snap.error.is_none(),
            refreshing: snap.stale && snap.in_flight && snap.value.is_some(),
            posts: snap.value,
            error: snap.error,
        }
    }

    /// Mark the feed stale and schedule one background re-fetch.
    ///
    /// Returns whether a fetch was scheduled for this invalidation. An invalidation that lands
    /// while an earlier invalidation's re-fetch is running is absorbed by it. One that lands
    /// during the first load gets a single follow-up fetch once that load resolves, since
    /// the load may have been answered before the change being invalidated for.
    pub fn invalidate(&self) -> bool {
        match self.cache.invalidate(QueryKey::AllPosts) {
            Invalidation::Started => {
                tracing::debug!("Invalidated {}, re-fetching", QueryKey::AllPosts.as_str());
                self.spawn_fetch();
                true
            }
            Invalidation::Deferred => {
                tracing::debug!(
                    "Invalidated {} during first load, re-fetching after it",
                    QueryKey::AllPosts.as_str()
                );
                true
            }
            Invalidation::Absorbed => {
                tracing::debug!(
                    "Invalidated {} while a re-fetch is in flight",
                    QueryKey::AllPosts.as_str()
                );
                false
            }
        }
    }

    /// Receiver that changes whenever the feed state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.cache.subscribe()
    }

    /// Wait until the feed satisfies `pred`, returning the matching snapshot.
    pub async fn wait_for<F>(&self, mut pred: F) -> FeedSnapshot
    where
        F: FnMut(&FeedSnapshot) -> bool,
    {
        let mut rx = self.subscribe();
        loop {
            rx.borrow_and_update();
            let snap = self.snapshot();
            if pred(&snap) {
                return snap;
            }
            // The sender lives in the cache we hold, so this only fails if it is gone.
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    fn spawn_fetch(&self) {
        let api = self.api.clone();
        let cache = self.cache.clone();
        tokio::spawn(async move {
            loop {
                let result = api.list_posts().await.map_err(|e| {
                    tracing::warn!("Failed to fetch feed: {}", e);
                    e.to_string()
                });
                if let Ok(posts) = &result {
                    tracing::debug!("Fetched {} posts", posts.len());
                }
                if !cache.complete(QueryKey::AllPosts, result) {
                    break;
                }
                tracing::debug!("Re-fetching {}", QueryKey::AllPosts.as_str());
            }
        });
    }
}
