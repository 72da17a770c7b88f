//! Error handling module for the Chirp client.
//!
//! Provides the client error type, the wire error envelope returned by the post service,
//! and the mapping from failures to user-facing messages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
}

/// Shown when a failed submission carries no usable `content` field error.
pub const GENERIC_POST_FAILURE: &str = "Failed to post! Please try again later!";

/// Field whose validation errors are surfaced to the author of a post.
pub const CONTENT_FIELD: &str = "content";

/// Client error type.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Structured, field-scoped validation failure
    Validation {
        message: String,
        field_errors: HashMap<String, Vec<String>>,
    },
    /// Session missing or rejected
    Unauthorized(String),
    /// Any other non-success response
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// Request exceeded the configured timeout
    Timeout,
    /// Connection-level failure
    Transport(String),
    /// Response body did not match the expected shape
    Decode(String),
}

impl ClientError {
    /// Get the error code for this error.
    pub fn code(&self) -> &str {
        match self {
            ClientError::Validation { .. } => codes::VALIDATION_ERROR,
            ClientError::Unauthorized(_) => codes::UNAUTHORIZED,
            ClientError::Api { code, .. } => code.as_str(),
            ClientError::Timeout => codes::TIMEOUT,
            ClientError::Transport(_) => codes::TRANSPORT_ERROR,
            ClientError::Decode(_) => codes::DECODE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ClientError::Validation { message, .. } => message.clone(),
            ClientError::Unauthorized(msg) => msg.clone(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Timeout => "Request timed out".to_string(),
            ClientError::Transport(msg) => msg.clone(),
            ClientError::Decode(msg) => msg.clone(),
        }
    }

    /// Validation messages reported for `field`, if any.
    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        match self {
            ClientError::Validation { field_errors, .. } => {
                field_errors.get(field).map(Vec::as_slice)
            }
            _ => None,
        }
    }

    /// Message shown to the author when a post submission fails.
    ///
    /// The first `content` field error wins, verbatim. Anything else, including an empty
    /// first message, falls back to [`GENERIC_POST_FAILURE`].
    pub fn submission_message(&self) -> String {
        self.field_errors(CONTENT_FIELD)
            .and_then(|errors| errors.first())
            .filter(|msg| !msg.is_empty())
            .cloned()
            .unwrap_or_else(|| GENERIC_POST_FAILURE.to_string())
    }

    /// Build a client error from a non-success status and its (possibly absent) envelope.
    pub fn from_response(status: u16, envelope: Option<ErrorResponse>) -> Self {
        let Some(envelope) = envelope else {
            return if status == 401 {
                ClientError::Unauthorized(format!("HTTP {}", status))
            } else {
                ClientError::Api {
                    status,
                    code: codes::INTERNAL_ERROR.to_string(),
                    message: format!("HTTP {}", status),
                }
            };
        };

        let ErrorDetails {
            code,
            message,
            details,
        } = envelope.error;
        let field_errors = details.map(|d| d.field_errors).unwrap_or_default();

        if code == codes::VALIDATION_ERROR || !field_errors.is_empty() {
            ClientError::Validation {
                message,
                field_errors,
            }
        } else if status == 401 || code == codes::UNAUTHORIZED {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Api {
                status,
                code,
                message,
            }
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            tracing::warn!("Request timed out: {:?}", err);
            ClientError::Timeout
        } else if err.is_decode() {
            tracing::error!("Decode error: {:?}", err);
            ClientError::Decode(format!("Decode error: {}", err))
        } else {
            tracing::error!("Transport error: {:?}", err);
            ClientError::Transport(format!("Transport error: {}", err))
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        ClientError::Decode(format!("JSON error: {}", err))
    }
}

/// Field-level validation failures carried in the error details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetails {
    #[serde(default)]
    pub field_errors: HashMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_errors: Vec<String>,
}

/// Error details in the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationDetails>,
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}
