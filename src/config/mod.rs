//! Configuration module for the Chirp client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the post service, without a trailing slash
    pub api_url: String,
    /// Bearer token for the signed-in session
    pub session_token: Option<String>,
    /// Identifier of the signed-in user
    pub user_id: Option<String>,
    /// Username of the signed-in user
    pub username: Option<String>,
    /// Avatar of the signed-in user
    pub profile_image_url: Option<String>,
    /// Upper bound for any single request to the post service
    pub request_timeout: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("CHIRP_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = match env::var("CHIRP_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "Invalid CHIRP_REQUEST_TIMEOUT_SECS {:?}, using {}s",
                        raw,
                        DEFAULT_TIMEOUT_SECS
                    );
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
                }
            },
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let log_level = env::var("CHIRP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_url,
            session_token: non_empty_var("CHIRP_SESSION_TOKEN"),
            user_id: non_empty_var("CHIRP_USER_ID"),
            username: non_empty_var("CHIRP_USERNAME"),
            profile_image_url: non_empty_var("CHIRP_PROFILE_IMAGE_URL"),
            request_timeout,
            log_level,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 7] = [
        "CHIRP_API_URL",
        "CHIRP_SESSION_TOKEN",
        "CHIRP_USER_ID",
        "CHIRP_USERNAME",
        "CHIRP_PROFILE_IMAGE_URL",
        "CHIRP_REQUEST_TIMEOUT_SECS",
        "CHIRP_LOG_LEVEL",
    ];

    // Env vars are process-wide; keep every env mutation inside this one test.
    #[test]
    fn test_config_from_env() {
        for key in VARS {
            env::remove_var(key);
        }

        let config = Config::from_env();

        assert_eq!(config.api_url, "http://127.0.0.1:3000");
        assert!(config.session_token.is_none());
        assert!(config.username.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, "info");

        env::set_var("CHIRP_API_URL", "https://chirp.example/");
        env::set_var("CHIRP_SESSION_TOKEN", "tok");
        env::set_var("CHIRP_USERNAME", "  ");
        env::set_var("CHIRP_REQUEST_TIMEOUT_SECS", "zero");

        let config = Config::from_env();

        assert_eq!(config.api_url, "https://chirp.example");
        assert_eq!(config.session_token.as_deref(), Some("tok"));
        assert!(config.username.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(10));

        env::set_var("CHIRP_REQUEST_TIMEOUT_SECS", "3");
        assert_eq!(Config::from_env().request_timeout, Duration::from_secs(3));

        for key in VARS {
            env::remove_var(key);
        }
    }
}
