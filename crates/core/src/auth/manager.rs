//! Authorization manager with background renewal
//!
//! Owns the OAuth2 grant state machine for one named integration:
//! - First authorization via `authorization_code`, rotation via `refresh_token`
//! - The in-memory access token, published atomically after persistence
//! - A periodic renewal tick (see [`super::renewal`])
//! - A health signal for the embedding application

use std::sync::Arc;
use std::time::Duration as StdDuration;

use amocrm_domain::constants::MAX_RENEWAL_WINDOW_SECS;
use amocrm_domain::{
    AccessToken, AmoError, AuthHealth, AuthState, AuthorizationRecord, GrantRequest, RenewalConfig,
    Result, TokenGrant,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex as SyncMutex;
use tokio::sync::{watch, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::ports::{AccessTokenProvider, GrantClient, TokenStore};

/// Timing parameters of the token lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalSettings {
    /// Period of the background renewal tick.
    pub interval: StdDuration,
    /// A tick refreshes once the record expires within this window.
    pub refresh_threshold: Duration,
    /// Subtracted from the provider-reported lifetime before persisting.
    pub expiry_margin: Duration,
}

impl Default for RenewalSettings {
    fn default() -> Self {
        Self::from(&RenewalConfig::default())
    }
}

impl From<&RenewalConfig> for RenewalSettings {
    fn from(config: &RenewalConfig) -> Self {
        Self {
            interval: StdDuration::from_secs(config.interval_secs.max(1)),
            refresh_threshold: window(config.refresh_threshold_secs),
            expiry_margin: window(config.expiry_margin_secs),
        }
    }
}

/// Seconds as a renewal window, capped at [`MAX_RENEWAL_WINDOW_SECS`].
fn window(secs: u64) -> Duration {
    let secs = i64::try_from(secs.min(MAX_RENEWAL_WINDOW_SECS)).unwrap_or(i64::MAX);
    Duration::try_seconds(secs).unwrap_or(Duration::MAX)
}

/// Result of a single renewal tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// The stored record is outside the refresh window; nothing was sent.
    NotDue,
    /// A refresh grant succeeded and the rotated record was persisted.
    Refreshed,
    /// The manager is not authorized (never opened, or the provider rejected
    /// the credentials); nothing was sent.
    Skipped,
}

#[derive(Debug, Default)]
struct HealthStats {
    consecutive_failures: u32,
    last_error: Option<String>,
    last_refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
enum Persist {
    Create,
    Overwrite,
}

/// OAuth2 token lifecycle for one integration
///
/// All grants (foreground `open`/`reauthorize` and background ticks) are
/// serialised by a single lock, so at most one exchange is in flight per
/// manager. Readers of the access token never wait on a grant.
pub struct AuthManager<G: ?Sized, S: ?Sized> {
    grant_client: Arc<G>,
    token_store: Arc<S>,
    app_name: String,
    settings: RenewalSettings,
    current: RwLock<Option<AccessToken>>,
    grant_lock: Mutex<()>,
    state: watch::Sender<AuthState>,
    stats: SyncMutex<HealthStats>,
    pub(super) renewal: SyncMutex<Option<CancellationToken>>,
}

impl<G, S> AuthManager<G, S>
where
    G: GrantClient + ?Sized + 'static,
    S: TokenStore + ?Sized + 'static,
{
    /// Create a manager in the `Uninitialized` state
    ///
    /// # Arguments
    /// * `grant_client` - Client for the provider's token endpoint
    /// * `token_store` - Persistence for the authorization record
    /// * `app_name` - Key of the authorization record
    /// * `settings` - Renewal interval, refresh window and expiry margin
    pub fn new(
        grant_client: Arc<G>,
        token_store: Arc<S>,
        app_name: impl Into<String>,
        settings: RenewalSettings,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Uninitialized);
        Self {
            grant_client,
            token_store,
            app_name: app_name.into(),
            settings,
            current: RwLock::new(None),
            grant_lock: Mutex::new(()),
            state,
            stats: SyncMutex::new(HealthStats::default()),
            renewal: SyncMutex::new(None),
        }
    }

    /// Key of the authorization record this manager owns
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Renewal timing in effect
    #[must_use]
    pub const fn settings(&self) -> &RenewalSettings {
        &self.settings
    }

    /// Initialise the manager from the token store
    ///
    /// - No stored record: exchanges `code` (`authorization_code` grant) and
    ///   creates the record.
    /// - Stored record: performs a `refresh_token` grant and overwrites the
    ///   stored refresh token and expiry.
    ///
    /// On failure the previously published token (if any) stays in place.
    ///
    /// # Errors
    /// Returns `AmoError::Auth` if no code is available for a first
    /// authorization, or if any grant, decode or storage step fails.
    pub async fn open(&self, code: Option<&str>) -> Result<()> {
        let _guard = self.grant_lock.lock().await;
        let previous = self.state();
        self.set_state(AuthState::Authorizing);

        let record = match self.token_store.get(&self.app_name).await {
            Ok(record) => record,
            Err(err) => return Err(self.fail_open(previous, err)),
        };

        let result = match (record, code) {
            (Some(record), _) => {
                debug!(app_name = %self.app_name, "stored authorization found; refreshing");
                self.refresh_with(&record).await
            }
            (None, Some(code)) => {
                debug!(app_name = %self.app_name, "no stored authorization; exchanging code");
                self.authorize_with_code(code, Persist::Create).await
            }
            (None, None) => {
                self.set_state(previous);
                return Err(AmoError::Auth(format!(
                    "no stored authorization for '{}' and no authorization code supplied",
                    self.app_name
                )));
            }
        };

        match result {
            Ok(()) => {
                info!(app_name = %self.app_name, "integration authorized");
                Ok(())
            }
            Err(err) => Err(self.fail_open(previous, err)),
        }
    }

    /// Force a fresh `authorization_code` grant and overwrite the stored
    /// record
    ///
    /// This is the way out of `AuthFailed` once the integration has been
    /// re-installed and a new code issued.
    ///
    /// # Errors
    /// Returns `AmoError::Auth` if the exchange or persistence fails.
    pub async fn reauthorize(&self, code: &str) -> Result<()> {
        let _guard = self.grant_lock.lock().await;
        let previous = self.state();
        self.set_state(AuthState::Authorizing);

        match self.authorize_with_code(code, Persist::Overwrite).await {
            Ok(()) => {
                info!(app_name = %self.app_name, "integration re-authorized");
                Ok(())
            }
            Err(err) => Err(self.fail_open(previous, err)),
        }
    }

    /// Current access token
    ///
    /// # Errors
    /// Returns `AmoError::NotAuthenticated` before the first successful grant.
    pub async fn access_token(&self) -> Result<AccessToken> {
        self.current.read().await.clone().ok_or_else(|| {
            AmoError::NotAuthenticated(format!(
                "integration '{}' has not been authorized",
                self.app_name
            ))
        })
    }

    /// Whether an access token has been published
    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Run one renewal tick
    ///
    /// Reloads the persisted record under the grant lock and refreshes it when
    /// it expires within the refresh threshold.
    ///
    /// # Errors
    /// Returns the grant or storage error of a failed refresh; the failure is
    /// also reflected in [`Self::health`].
    pub async fn renew_if_due(&self) -> Result<RenewalOutcome> {
        let _guard = self.grant_lock.lock().await;

        let state = self.state();
        if matches!(state, AuthState::Uninitialized | AuthState::AuthFailed) {
            debug!(app_name = %self.app_name, %state, "renewal skipped");
            return Ok(RenewalOutcome::Skipped);
        }

        let record = match self.token_store.get(&self.app_name).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                let err = AmoError::NotFound(format!(
                    "authorization record for '{}' disappeared from the store",
                    self.app_name
                ));
                self.record_failure(&err, state);
                return Err(err);
            }
            Err(err) => {
                self.record_failure(&err, state);
                return Err(err);
            }
        };

        let now = Utc::now();
        if !record.is_due(now, self.settings.refresh_threshold) {
            debug!(
                app_name = %self.app_name,
                expires_at = %record.expires_at,
                "token not due for renewal"
            );
            return Ok(RenewalOutcome::NotDue);
        }

        self.set_state(AuthState::Refreshing);
        match self.refresh_with(&record).await {
            Ok(()) => {
                info!(app_name = %self.app_name, "access token renewed");
                Ok(RenewalOutcome::Refreshed)
            }
            Err(err) => {
                self.record_failure(&err, AuthState::Authorized);
                Err(err)
            }
        }
    }

    /// Current state of the lifecycle
    #[must_use]
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Watch channel of state transitions
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Health snapshot for the embedding application
    #[must_use]
    pub fn health(&self) -> AuthHealth {
        let stats = self.stats.lock();
        AuthHealth {
            state: self.state(),
            consecutive_failures: stats.consecutive_failures,
            last_error: stats.last_error.clone(),
            last_refreshed_at: stats.last_refreshed_at,
        }
    }

    async fn refresh_with(&self, record: &AuthorizationRecord) -> Result<()> {
        let grant = self
            .grant_client
            .exchange(&GrantRequest::RefreshToken { refresh_token: record.refresh_token.clone() })
            .await?;
        let expires_at = grant.expires_at(Utc::now(), self.settings.expiry_margin)?;

        self.token_store.upsert(&self.app_name, &grant.refresh_token, expires_at).await?;
        self.publish(grant, expires_at).await;
        Ok(())
    }

    async fn authorize_with_code(&self, code: &str, persist: Persist) -> Result<()> {
        let grant = self
            .grant_client
            .exchange(&GrantRequest::AuthorizationCode { code: code.to_owned() })
            .await?;
        let expires_at = grant.expires_at(Utc::now(), self.settings.expiry_margin)?;

        match persist {
            Persist::Create => {
                let record = AuthorizationRecord::new(
                    self.app_name.clone(),
                    grant.refresh_token.clone(),
                    expires_at,
                );
                self.token_store.create(&record).await?;
            }
            Persist::Overwrite => {
                self.token_store.upsert(&self.app_name, &grant.refresh_token, expires_at).await?;
            }
        }

        self.publish(grant, expires_at).await;
        Ok(())
    }

    /// Swap in the new access token; called only after persistence succeeded.
    async fn publish(&self, grant: TokenGrant, expires_at: DateTime<Utc>) {
        *self.current.write().await = Some(AccessToken::new(grant.access_token));

        {
            let mut stats = self.stats.lock();
            stats.consecutive_failures = 0;
            stats.last_error = None;
            stats.last_refreshed_at = Some(Utc::now());
        }
        self.set_state(AuthState::Authorized);

        debug!(app_name = %self.app_name, %expires_at, "access token published");
    }

    fn fail_open(&self, previous: AuthState, err: AmoError) -> AmoError {
        self.record_failure(&err, previous);
        match err {
            AmoError::Auth(_) => err,
            other => AmoError::Auth(format!("authorization of '{}' failed: {other}", self.app_name)),
        }
    }

    /// Provider rejections (`Auth`) are terminal until re-authorization;
    /// everything else leaves the manager in `fallback`.
    fn record_failure(&self, err: &AmoError, fallback: AuthState) {
        let failures = {
            let mut stats = self.stats.lock();
            stats.consecutive_failures = stats.consecutive_failures.saturating_add(1);
            stats.last_error = Some(err.to_string());
            stats.consecutive_failures
        };

        if matches!(err, AmoError::Auth(_)) {
            error!(
                app_name = %self.app_name,
                error = %err,
                "provider rejected credentials; renewal suspended until re-authorization"
            );
            self.set_state(AuthState::AuthFailed);
        } else {
            warn!(app_name = %self.app_name, error = %err, failures, "token grant failed");
            self.set_state(fallback);
        }
    }

    /// Leave `Refreshing` after a tick was dropped before its grant finished.
    pub(super) fn abandon_tick(&self) {
        if self.state() == AuthState::Refreshing {
            self.set_state(AuthState::Authorized);
        }
    }

    fn set_state(&self, next: AuthState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(app_name = %self.app_name, state = %next, "auth state changed");
        }
    }
}

#[async_trait]
impl<G, S> AccessTokenProvider for AuthManager<G, S>
where
    G: GrantClient + ?Sized + 'static,
    S: TokenStore + ?Sized + 'static,
{
    async fn access_token(&self) -> Result<AccessToken> {
        Self::access_token(self).await
    }
}
