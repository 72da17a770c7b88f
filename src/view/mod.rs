//! Feed and home-screen rendering.
//!
//! Views are plain data built from a session, a composer and a feed snapshot; `Display`
//! turns them into the terminal rendering.

mod time;

pub use time::relative_time;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::auth::Session;
use crate::composer::{Composer, ComposerView};
use crate::feed::{FeedSnapshot, FeedStatus};
use crate::models::PostWithAuthor;

/// Shown when the feed could not be fetched.
pub const FEED_ERROR: &str = "Something went wrong";

/// Location of a user's profile.
pub fn profile_path(username: &str) -> String {
    format!("/@{}", username)
}

/// Permalink of a single post.
pub fn post_path(post_id: &str) -> String {
    format!("/post/{}", post_id)
}

/// One rendered feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    /// Stable identity of the row: the post id.
    pub key: String,
    pub author_handle: String,
    pub profile_href: String,
    pub permalink: String,
    pub posted_ago: String,
    pub content: String,
    pub avatar_url: String,
    pub avatar_alt: String,
}

impl PostRow {
    pub fn project(entry: &PostWithAuthor, now: DateTime<Utc>) -> Self {
        let PostWithAuthor { post, author } = entry;
        let handle = format!("@{}", author.username);
        Self {
            key: post.id.clone(),
            avatar_alt: format!("{}'s profile picture", handle),
            author_handle: handle,
            profile_href: profile_path(&author.username),
            permalink: post_path(&post.id),
            posted_ago: relative_time(post.created_at, now),
            content: post.content.clone(),
            avatar_url: author.profile_image_url.clone(),
        }
    }
}

/// The feed area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedView {
    Loading,
    Error(&'static str),
    Rows(Vec<PostRow>),
}

impl FeedView {
    pub fn from_snapshot(snapshot: &FeedSnapshot, now: DateTime<Utc>) -> Self {
        match snapshot.status() {
            FeedStatus::Loading => FeedView::Loading,
            FeedStatus::Error(err) => {
                tracing::debug!("Rendering feed error state: {}", err);
                FeedView::Error(FEED_ERROR)
            }
            FeedStatus::Ready(posts) => FeedView::Rows(
                posts
                    .iter()
                    .map(|entry| PostRow::project(entry, now))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for FeedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedView::Loading => writeln!(f, "Loading..."),
            FeedView::Error(msg) => writeln!(f, "{}", msg),
            FeedView::Rows(rows) if rows.is_empty() => writeln!(f, "No posts yet."),
            FeedView::Rows(rows) => {
                for row in rows {
                    writeln!(f, "{} · {}", row.author_handle, row.posted_ago)?;
                    writeln!(f, "  {}", row.content)?;
                }
                Ok(())
            }
        }
    }
}

/// The area above the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderView {
    SignIn,
    Composer(ComposerView),
}

/// The whole home screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeView {
    /// Identity not loaded yet; nothing is drawn.
    Blank,
    Page { header: HeaderView, feed: FeedView },
}

impl HomeView {
    pub fn build(
        session: &Session,
        composer: Option<&Composer>,
        feed: &FeedSnapshot,
        now: DateTime<Utc>,
    ) -> Self {
        if !session.loaded {
            return HomeView::Blank;
        }

        let header = match (session.signed_in, composer) {
            (true, Some(composer)) => HeaderView::Composer(composer.view()),
            _ => HeaderView::SignIn,
        };

        HomeView::Page {
            header,
            feed: FeedView::from_snapshot(feed, now),
        }
    }
}

impl fmt::Display for HomeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let HomeView::Page { header, feed } = self else {
            return Ok(());
        };

        match header {
            HeaderView::SignIn => writeln!(f, "[ Sign in to post ]")?,
            HeaderView::Composer(view) if view.show_spinner => {
                writeln!(f, "> {}  (posting...)", view.draft)?
            }
            HeaderView::Composer(view) if view.draft.is_empty() => {
                writeln!(f, "> {}", view.placeholder)?
            }
            HeaderView::Composer(view) => writeln!(f, "> {}  [Post]", view.draft)?,
        }
        writeln!(f, "{}", "─".repeat(40))?;
        write!(f, "{}", feed)
    }
}
