//! OAuth2 credential types

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AmoError, Result};
use crate::impl_wire_conversions;

/// Persisted credential for one named integration.
///
/// `expires_at` already includes the safety margin subtracted from the
/// provider-reported lifetime.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    pub app_name: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationRecord {
    pub fn new(
        app_name: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self { app_name: app_name.into(), refresh_token: refresh_token.into(), expires_at }
    }

    /// True when the record expires within `threshold` of `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        now.checked_add_signed(threshold).map_or(true, |limit| self.expires_at <= limit)
    }
}

impl fmt::Debug for AuthorizationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationRecord")
            .field("app_name", &self.app_name)
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Grant type sent to the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

impl_wire_conversions!(GrantType {
    AuthorizationCode => "authorization_code",
    RefreshToken => "refresh_token",
});

/// One token-endpoint exchange, carrying the grant-specific secret.
#[derive(Clone, PartialEq, Eq)]
pub enum GrantRequest {
    AuthorizationCode { code: String },
    RefreshToken { refresh_token: String },
}

impl GrantRequest {
    #[must_use]
    pub const fn grant_type(&self) -> GrantType {
        match self {
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
        }
    }
}

impl fmt::Debug for GrantRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GrantRequest({})", self.grant_type())
    }
}

/// Successful token-endpoint response
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenGrant {
    #[serde(default)]
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenGrant {
    /// Expiry to persist: `now + expires_in - margin`.
    ///
    /// # Errors
    /// Returns `AmoError::Decode` if `expires_in` does not fit a timestamp.
    pub fn expires_at(&self, now: DateTime<Utc>, margin: Duration) -> Result<DateTime<Utc>> {
        Duration::try_seconds(self.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .and_then(|expiry| expiry.checked_sub_signed(margin))
            .ok_or_else(|| {
                AmoError::Decode(format!("token lifetime out of range: {}s", self.expires_in))
            })
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// In-memory bearer credential.
///
/// Cloning is cheap and a clone is always a complete token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Arc<str>);

impl AccessToken {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Lifecycle state of an authorization manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Uninitialized,
    Authorizing,
    Authorized,
    Refreshing,
    /// The provider rejected our credentials; renewal is suspended.
    AuthFailed,
}

impl_wire_conversions!(AuthState {
    Uninitialized => "uninitialized",
    Authorizing => "authorizing",
    Authorized => "authorized",
    Refreshing => "refreshing",
    AuthFailed => "auth_failed",
});

/// Snapshot of token-lifecycle health for the embedding application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHealth {
    pub state: AuthState,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl AuthHealth {
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self.state, AuthState::Authorized | AuthState::Refreshing)
            && self.consecutive_failures == 0
    }
}
