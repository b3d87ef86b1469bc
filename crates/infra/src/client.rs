//! `AmoClient`: one authenticated connection to an amoCRM account
//!
//! Wires the HTTP stack, the grant client, the token store and the
//! [`AuthManager`] together, opens the authorization and keeps the access
//! token fresh in the background until [`AmoClient::shutdown`].
//!
//! Several clients (different `app_name`s or accounts) can live in one
//! process; nothing here is global.

use std::sync::Arc;

use amocrm_core::{
    AccessTokenProvider, AuthManager, RenewalHandle, RenewalSettings, RequestExecutor, TokenStore,
};
use amocrm_domain::{AmoConfig, AuthHealth, Result};
use parking_lot::Mutex;
use tracing::{info, instrument};

use crate::api::HttpRequestExecutor;
use crate::auth::OAuthGrantClient;
use crate::http::HttpClient;
use crate::resources::{Catalogs, Contacts, Leads, Notes, Tasks};
use crate::storage::SqliteTokenStore;

/// Auth manager as wired by [`AmoClient`]
pub type ClientAuthManager = AuthManager<OAuthGrantClient, dyn TokenStore>;

/// Connected amoCRM client
pub struct AmoClient {
    auth: Arc<ClientAuthManager>,
    executor: Arc<HttpRequestExecutor>,
    renewal: Mutex<Option<RenewalHandle>>,
    leads: Leads,
    contacts: Contacts,
    tasks: Tasks,
    notes: Notes,
    catalogs: Catalogs,
}

impl AmoClient {
    /// Validate `config`, open the stored (or freshly granted)
    /// authorization and start background renewal.
    ///
    /// # Errors
    /// - `AmoError::Config` for an invalid configuration
    /// - `AmoError::Auth` when no authorization can be established
    /// - `AmoError::InvalidInput` if the HTTP client cannot be built
    #[instrument(skip_all, fields(app_name = %config.app_name))]
    pub async fn connect(config: &AmoConfig, token_store: Arc<dyn TokenStore>) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::from_config(&config.http)?;
        let grant_client = Arc::new(OAuthGrantClient::from_config(http.clone(), config)?);
        let auth = Arc::new(AuthManager::new(
            grant_client,
            token_store,
            config.app_name.clone(),
            RenewalSettings::from(&config.renewal),
        ));

        auth.open(config.auth_code.as_deref()).await?;
        let renewal = auth.start_renewal()?;

        let tokens: Arc<dyn AccessTokenProvider> = Arc::clone(&auth) as _;
        let executor = Arc::new(HttpRequestExecutor::from_config(http, config, tokens)?);

        info!(base_url = %executor.base_url(), "amoCRM client connected");
        Ok(Self::assemble(auth, executor, renewal))
    }

    /// [`Self::connect`] with a [`SqliteTokenStore`] opened from
    /// `config.storage`.
    ///
    /// # Errors
    /// `AmoError::Storage` if the database cannot be opened, otherwise as
    /// [`Self::connect`].
    pub async fn connect_sqlite(config: &AmoConfig) -> Result<Self> {
        let store = SqliteTokenStore::from_config(&config.storage)?;
        Self::connect(config, Arc::new(store)).await
    }

    fn assemble(
        auth: Arc<ClientAuthManager>,
        executor: Arc<HttpRequestExecutor>,
        renewal: RenewalHandle,
    ) -> Self {
        let shared: Arc<dyn RequestExecutor> = Arc::clone(&executor) as _;
        Self {
            leads: Leads::new(Arc::clone(&shared)),
            contacts: Contacts::new(Arc::clone(&shared)),
            tasks: Tasks::new(Arc::clone(&shared)),
            notes: Notes::new(Arc::clone(&shared)),
            catalogs: Catalogs::new(shared),
            auth,
            executor,
            renewal: Mutex::new(Some(renewal)),
        }
    }

    #[must_use]
    pub const fn leads(&self) -> &Leads {
        &self.leads
    }

    #[must_use]
    pub const fn contacts(&self) -> &Contacts {
        &self.contacts
    }

    #[must_use]
    pub const fn tasks(&self) -> &Tasks {
        &self.tasks
    }

    #[must_use]
    pub const fn notes(&self) -> &Notes {
        &self.notes
    }

    #[must_use]
    pub const fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Executor for endpoints without a typed wrapper.
    #[must_use]
    pub const fn executor(&self) -> &Arc<HttpRequestExecutor> {
        &self.executor
    }

    #[must_use]
    pub const fn auth(&self) -> &Arc<ClientAuthManager> {
        &self.auth
    }

    #[must_use]
    pub fn health(&self) -> AuthHealth {
        self.auth.health()
    }

    /// Stop background renewal. Idempotent.
    ///
    /// # Errors
    /// `AmoError::Internal` if the renewal task does not stop cleanly.
    pub async fn shutdown(&self) -> Result<()> {
        let handle = self.renewal.lock().take();
        match handle {
            Some(handle) => handle.stop().await,
            None => Ok(()),
        }
    }
}
