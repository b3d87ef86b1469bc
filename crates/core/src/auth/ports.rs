//! Port interfaces for the token lifecycle
//!
//! These traits abstract the two external collaborators of the
//! authorization manager (credential persistence and the provider's token
//! endpoint) so the state machine can be exercised with in-memory fakes.

use async_trait::async_trait;
use amocrm_domain::{AccessToken, AuthorizationRecord, GrantRequest, Result, TokenGrant};
use chrono::{DateTime, Utc};

/// Durable store holding at most one authorization record per integration
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the record for `app_name`
    ///
    /// # Returns
    /// `None` when the integration has never been authorized
    ///
    /// # Errors
    /// Returns `AmoError::Storage` if the backend cannot be read
    async fn get(&self, app_name: &str) -> Result<Option<AuthorizationRecord>>;

    /// Overwrite the refresh token and expiry for `app_name`
    ///
    /// Creates the record when it does not exist yet.
    ///
    /// # Errors
    /// Returns `AmoError::Storage` if the write fails
    async fn upsert(
        &self,
        app_name: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Insert a brand-new record
    ///
    /// # Errors
    /// Returns `AmoError::Storage` if a record for the same app already
    /// exists or the write fails
    async fn create(&self, record: &AuthorizationRecord) -> Result<()>;
}

/// Client for the provider's OAuth2 token endpoint
#[async_trait]
pub trait GrantClient: Send + Sync {
    /// Perform one grant exchange
    ///
    /// # Errors
    /// - `AmoError::Auth` when the provider rejects the grant (4xx)
    /// - `AmoError::Transport` on connection problems
    /// - `AmoError::Decode` when the response is not a token grant
    async fn exchange(&self, grant: &GrantRequest) -> Result<TokenGrant>;
}

/// Source of the bearer token attached to API calls
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Current access token
    ///
    /// # Errors
    /// Returns `AmoError::NotAuthenticated` before the first successful grant
    async fn access_token(&self) -> Result<AccessToken>;
}
