//! In-memory [`PostsApi`] for unit tests.
//!
//! Both procedures can be gated: a gated call counts itself, then parks until the test
//! releases it, which keeps a request observably in flight.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::PostsApi;
use crate::errors::ClientError;
use crate::models::{Author, CreatePostRequest, Post, PostWithAuthor};

pub(crate) fn entry(id: &str, username: &str, content: &str) -> PostWithAuthor {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let offset = id.bytes().map(i64::from).sum::<i64>();
    PostWithAuthor {
        post: Post {
            id: id.to_string(),
            content: content.to_string(),
            created_at: base + Duration::seconds(offset),
            author_id: format!("user_{}", username),
        },
        author: Author {
            id: format!("user_{}", username),
            username: username.to_string(),
            profile_image_url: format!("https://img.example/{}.png", username),
        },
    }
}

pub(crate) struct FakePostsApi {
    feed: Mutex<Vec<PostWithAuthor>>,
    fetch_failure: Mutex<Option<ClientError>>,
    create_failure: Mutex<Option<ClientError>>,
    fetch_gate: Semaphore,
    create_gate: Semaphore,
    fetches: AtomicUsize,
    creates: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

impl FakePostsApi {
    pub(crate) fn new(feed: Vec<PostWithAuthor>) -> Self {
        Self {
            feed: Mutex::new(feed),
            fetch_failure: Mutex::new(None),
            create_failure: Mutex::new(None),
            fetch_gate: Semaphore::new(Semaphore::MAX_PERMITS),
            create_gate: Semaphore::new(Semaphore::MAX_PERMITS),
            fetches: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Hold every fetch until [`release_fetches`](Self::release_fetches).
    pub(crate) fn gated_fetches(mut self) -> Self {
        self.fetch_gate = Semaphore::new(0);
        self
    }

    /// Hold every create until [`release_creates`](Self::release_creates).
    pub(crate) fn gated_creates(mut self) -> Self {
        self.create_gate = Semaphore::new(0);
        self
    }

    pub(crate) fn release_fetches(&self, n: usize) {
        self.fetch_gate.add_permits(n);
    }

    pub(crate) fn release_creates(&self, n: usize) {
        self.create_gate.add_permits(n);
    }

    pub(crate) fn set_feed(&self, feed: Vec<PostWithAuthor>) {
        *self.feed.lock() = feed;
    }

    pub(crate) fn fail_fetches(&self, err: Option<ClientError>) {
        *self.fetch_failure.lock() = err;
    }

    pub(crate) fn fail_creates(&self, err: Option<ClientError>) {
        *self.create_failure.lock() = err;
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl PostsApi for FakePostsApi {
    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Answer with the feed as it was when the request arrived.
        let failure = self.fetch_failure.lock().clone();
        let feed = self.feed.lock().clone();
        self.fetch_gate.acquire().await.unwrap().forget();

        match failure {
            Some(err) => Err(err),
            None => Ok(feed),
        }
    }

    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, ClientError> {
        let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.lock().push(request.content.clone());
        self.create_gate.acquire().await.unwrap().forget();

        if let Some(err) = self.create_failure.lock().clone() {
            return Err(err);
        }

        let created = entry(&format!("new-{}", n), "ferris", &request.content);
        self.feed.lock().insert(0, created.clone());
        Ok(created.post)
    }
}
