//! Chirp terminal client
//!
//! Shows the micro-post feed and lets the signed-in user publish posts. Each line typed on
//! stdin becomes the draft and is submitted as if Enter was pressed in the composer.

mod api;
mod auth;
mod cache;
mod composer;
mod config;
mod errors;
mod feed;
mod models;
mod notify;
mod view;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{HttpPostsApi, PostsApi};
use auth::{IdentityProvider, Session, StaticIdentity};
use composer::{Composer, Key, SubmissionState, SubmitOutcome};
use config::Config;
use feed::FeedSync;
use notify::TerminalNotifier;
use view::HomeView;

const REFRESH_COMMAND: &str = ":refresh";
const QUIT_COMMAND: &str = ":quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Chirp client");
    tracing::info!("Post service: {}", config.api_url);
    tracing::info!("Request timeout: {:?}", config.request_timeout);

    let identity = StaticIdentity::new(Session::from_config(&config));
    let session = identity.snapshot();
    match session.author() {
        Some(user) => tracing::info!("Signed in as @{}", user.username),
        None => tracing::warn!("No session configured (CHIRP_SESSION_TOKEN, CHIRP_USERNAME). Read-only mode"),
    }

    let api: Arc<dyn PostsApi> = Arc::new(HttpPostsApi::new(&config)?);
    let feed = FeedSync::new(api.clone());

    // Start fetching ASAP
    feed.prefetch();

    let composer = Composer::new(&session, api, feed.clone(), Arc::new(TerminalNotifier));

    // Redraw whenever the feed or the composer changes
    let render = {
        let session = session.clone();
        let feed = feed.clone();
        let composer = composer.clone();
        tokio::spawn(async move {
            let mut feed_rx = feed.subscribe();
            let mut composer_rx = composer.as_ref().map(Composer::subscribe);
            loop {
                let home = HomeView::build(
                    &session,
                    composer.as_ref(),
                    &feed.get_all(),
                    chrono::Utc::now(),
                );
                println!("\n{}", home);

                let composer_changed = async {
                    match composer_rx.as_mut() {
                        Some(rx) => rx.changed().await,
                        None => std::future::pending().await,
                    }
                };
                tokio::select! {
                    changed = feed_rx.changed() => if changed.is_err() { break },
                    changed = composer_changed => if changed.is_err() { break },
                }
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        match line {
            QUIT_COMMAND => break,
            REFRESH_COMMAND => {
                feed.invalidate();
            }
            _ => {
                let Some(composer) = composer.as_ref() else {
                    eprintln!("Sign in to post.");
                    continue;
                };
                // The input is disabled while posting.
                if composer.state() == SubmissionState::Submitting {
                    eprintln!("Still posting, hold on.");
                    continue;
                }
                composer.set_draft(line);
                if composer.handle_key(Key::Enter) == Some(SubmitOutcome::AlreadySubmitting) {
                    eprintln!("Still posting, hold on.");
                }
            }
        }
    }

    render.abort();
    if let Some(composer) = composer.as_ref() {
        composer.settled().await;
    }
    tracing::info!("Bye");

    Ok(())
}
