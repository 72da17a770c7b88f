//! Post and author models as served by the feed query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published post. Server-owned; the client never edits one in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
}

/// Public projection of a post's author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub username: String,
    pub profile_image_url: String,
}

/// One feed entry: a post with its denormalized author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Author,
}

/// Request body for creating a new post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub content: String,
}
