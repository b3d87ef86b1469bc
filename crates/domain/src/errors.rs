//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the amoCRM client
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AmoError {
    /// Connection failure, timeout or any other transport-level problem.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response body (success or problem) could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The token endpoint rejected a grant, or `open` could not complete.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Non-2xx application response with the composed problem message.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No access token has been published yet.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// Pagination aborted (page cap reached or cursor stalled).
    #[error("Pagination error: {0}")]
    Pagination(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification callers can use to build their own retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Protocol,
    Authentication,
    Client,
    Server,
    RateLimited,
    Storage,
    Configuration,
    Internal,
}

impl AmoError {
    /// Build an [`AmoError::Api`] from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api { status, message: message.into() }
    }

    /// Category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) => ErrorCategory::Network,
            Self::Decode(_) | Self::Pagination(_) => ErrorCategory::Protocol,
            Self::Auth(_) | Self::NotAuthenticated(_) => ErrorCategory::Authentication,
            Self::Api { status, .. } => match *status {
                429 => ErrorCategory::RateLimited,
                401 | 403 => ErrorCategory::Authentication,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            Self::NotFound(_) | Self::InvalidInput(_) => ErrorCategory::Client,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether repeating the same call later could succeed.
    ///
    /// The client itself never retries; this is a hint for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Server | ErrorCategory::RateLimited
        )
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AmoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for AmoError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidInput(format!("invalid URL: {err}"))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AmoError>;
