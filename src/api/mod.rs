//! Remote post API.
//!
//! [`PostsApi`] is the seam between the client state machines and the network;
//! [`HttpPostsApi`] talks to the post service over HTTP.

#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use http::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;
use crate::models::{CreatePostRequest, Post, PostWithAuthor};

/// Success response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Remote procedures used by the composer and the feed.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// Fetch the feed, newest first.
    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, ClientError>;

    /// Publish a new post as the session user.
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, ClientError>;
}
