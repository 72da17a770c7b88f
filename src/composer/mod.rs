//! Post composer.
//!
//! Holds the draft, runs submissions on background tasks, and reports progress through a
//! watch channel. At most one submission is in flight per composer; a second `submit()` while
//! one is pending is refused, never queued.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::PostsApi;
use crate::auth::{CurrentUser, Session};
use crate::feed::FeedSync;
use crate::models::CreatePostRequest;
use crate::notify::Notifier;

pub const PLACEHOLDER: &str = "Type some emojis!";

/// Whether a submission is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
}

/// Result of asking the composer to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A create request was sent.
    Started,
    /// Nothing to send; silently ignored.
    EmptyDraft,
    /// A submission is already in flight.
    AlreadySubmitting,
}

/// Keys the composer input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

/// Draft text and submission progress, published on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerState {
    pub draft: String,
    pub submission: SubmissionState,
}

/// What the composer row should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub avatar_url: String,
    pub placeholder: &'static str,
    pub draft: String,
    pub input_disabled: bool,
    pub show_post_button: bool,
    pub show_spinner: bool,
}

/// Composer for the signed-in user.
#[derive(Clone)]
pub struct Composer {
    user: CurrentUser,
    api: Arc<dyn PostsApi>,
    feed: FeedSync,
    notifier: Arc<dyn Notifier>,
    state: Arc<watch::Sender<ComposerState>>,
}

impl Composer {
    /// Returns `None` unless the session has a signed-in user.
    pub fn new(
        session: &Session,
        api: Arc<dyn PostsApi>,
        feed: FeedSync,
        notifier: Arc<dyn Notifier>,
    ) -> Option<Self> {
        let user = session.author()?.clone();
        let (state, _) = watch::channel(ComposerState::default());
        Some(Self {
            user,
            api,
            feed,
            notifier,
            state: Arc::new(state),
        })
    }

    /// Replace the draft text.
    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.draft = text);
    }

    pub fn draft(&self) -> String {
        self.state.borrow().draft.clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().submission
    }

    /// Send the draft as a new post.
    ///
    /// Returns as soon as the request is dispatched; the outcome lands in the composer
    /// state, the feed, and the notifier.
    pub fn submit(&self) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::Started;
        let mut content = String::new();

        self.state.send_if_modified(|s| {
            if s.draft.is_empty() {
                outcome = SubmitOutcome::EmptyDraft;
                return false;
            }
            if s.submission == SubmissionState::Submitting {
                outcome = SubmitOutcome::AlreadySubmitting;
                return false;
            }
            s.submission = SubmissionState::Submitting;
            content = s.draft.clone();
            true
        });

        if outcome != SubmitOutcome::Started {
            tracing::debug!("Submission refused: {:?}", outcome);
            return outcome;
        }

        let api = self.api.clone();
        let feed = self.feed.clone();
        let notifier = self.notifier.clone();
        let state = self.state.clone();
        let username = self.user.username.clone();

        tokio::spawn(async move {
            match api.create_post(CreatePostRequest { content }).await {
                Ok(post) => {
                    tracing::info!("@{} published post {}", username, post.id);
                    state.send_modify(|s| s.draft.clear());
                    feed.invalidate();
                    state.send_modify(|s| s.submission = SubmissionState::Idle);
                }
                Err(err) => {
                    tracing::warn!("Failed to publish post for @{}: {}", username, err);
                    state.send_modify(|s| s.submission = SubmissionState::Idle);
                    notifier.error(&err.submission_message());
                }
            }
        });

        outcome
    }

    /// Route a key press from the focused input. Enter submits.
    pub fn handle_key(&self, key: Key) -> Option<SubmitOutcome> {
        match key {
            Key::Enter => Some(self.submit()),
            Key::Other => None,
        }
    }

    pub fn view(&self) -> ComposerView {
        let state = self.state.borrow();
        let submitting = state.submission == SubmissionState::Submitting;
        ComposerView {
            avatar_url: self.user.profile_image_url.clone(),
            placeholder: PLACEHOLDER,
            draft: state.draft.clone(),
            input_disabled: submitting,
            show_post_button: !state.draft.is_empty() && !submitting,
            show_spinner: submitting,
        }
    }

    /// Wait until no submission is in flight.
    pub async fn settled(&self) {
        let mut rx = self.state.subscribe();
        // The sender is owned by `self`, so the channel cannot close while we wait.
        let _ = rx
            .wait_for(|s| s.submission == SubmissionState::Idle)
            .await;
    }

    /// Receiver that changes on every draft edit and submission transition.
    pub fn subscribe(&self) -> watch::Receiver<ComposerState> {
        self.state.subscribe()
    }
}
