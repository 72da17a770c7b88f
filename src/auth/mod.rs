//! Session identity for the Chirp client.
//!
//! The identity provider is external; the rest of the client only ever sees an immutable
//! [`Session`] snapshot handed to it at construction.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::config::Config;
use crate::errors::ClientError;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub profile_image_url: String,
}

/// Snapshot of the identity provider's state for one render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub loaded: bool,
    pub signed_in: bool,
    pub user: Option<CurrentUser>,
}

impl Session {
    /// The provider has not reported yet.
    pub fn loading() -> Self {
        Self {
            loaded: false,
            signed_in: false,
            user: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            loaded: true,
            signed_in: false,
            user: None,
        }
    }

    pub fn signed_in(user: CurrentUser) -> Self {
        Self {
            loaded: true,
            signed_in: true,
            user: Some(user),
        }
    }

    /// Build a session from the configured identity.
    ///
    /// A session is signed in only when both a token and a username are configured.
    pub fn from_config(config: &Config) -> Self {
        match (&config.session_token, &config.username) {
            (Some(_), Some(username)) => Self::signed_in(CurrentUser {
                id: config.user_id.clone().unwrap_or_else(|| username.clone()),
                username: username.clone(),
                profile_image_url: config.profile_image_url.clone().unwrap_or_default(),
            }),
            _ => Self::signed_out(),
        }
    }

    /// The user allowed to compose posts, if any.
    pub fn author(&self) -> Option<&CurrentUser> {
        if self.loaded && self.signed_in {
            self.user.as_ref()
        } else {
            None
        }
    }
}

/// Source of session snapshots.
pub trait IdentityProvider: Send + Sync {
    fn snapshot(&self) -> Session;
}

/// Identity provider with a fixed session, e.g. one resolved from config at startup.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    session: Session,
}

impl StaticIdentity {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl IdentityProvider for StaticIdentity {
    fn snapshot(&self) -> Session {
        self.session.clone()
    }
}

/// Default headers for an authenticated client.
pub fn auth_headers(token: Option<&str>) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::Transport(format!("Invalid session token: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
