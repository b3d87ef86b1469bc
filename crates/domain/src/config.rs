//! Configuration management

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_APP_NAME, DEFAULT_DB_PATH, DEFAULT_DOMAIN, DEFAULT_EXPIRY_MARGIN_SECS,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_REFRESH_THRESHOLD_SECS, DEFAULT_RENEWAL_INTERVAL_SECS,
    MAX_RENEWAL_WINDOW_SECS,
};
use crate::errors::{AmoError, Result};

/// Client configuration for one amoCRM integration
#[derive(Clone, Serialize, Deserialize)]
pub struct AmoConfig {
    /// Account base URL, e.g. `https://example.amocrm.ru`.
    #[serde(default)]
    pub base_url: String,
    /// Account subdomain; used when `base_url` is empty.
    #[serde(default)]
    pub subdomain: Option<String>,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub redirect_uri: String,
    /// One-time authorization code, only needed before the first grant.
    #[serde(default, skip_serializing)]
    pub auth_code: Option<String>,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub renewal: RenewalConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Token store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Background renewal configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RenewalConfig {
    #[serde(default = "default_renewal_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold_secs: u64,
    #[serde(default = "default_expiry_margin")]
    pub expiry_margin_secs: u64,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

const fn default_pool_size() -> u32 {
    4
}

const fn default_renewal_interval() -> u64 {
    DEFAULT_RENEWAL_INTERVAL_SECS
}

const fn default_refresh_threshold() -> u64 {
    DEFAULT_REFRESH_THRESHOLD_SECS
}

const fn default_expiry_margin() -> u64 {
    DEFAULT_EXPIRY_MARGIN_SECS
}

const fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: default_pool_size() }
    }
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_RENEWAL_INTERVAL_SECS,
            refresh_threshold_secs: DEFAULT_REFRESH_THRESHOLD_SECS,
            expiry_margin_secs: DEFAULT_EXPIRY_MARGIN_SECS,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS, user_agent: None }
    }
}

impl HttpConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AmoConfig {
    /// Minimal configuration; everything else takes its default.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            subdomain: None,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_code: None,
            app_name: default_app_name(),
            storage: StorageConfig::default(),
            renewal: RenewalConfig::default(),
            http: HttpConfig::default(),
        }
    }

    /// Resolve the account base URL.
    ///
    /// `base_url` wins when set; otherwise `subdomain` expands to
    /// `https://{subdomain}.amocrm.ru`.
    ///
    /// # Errors
    /// Returns `AmoError::Config` when neither is usable.
    pub fn resolved_base_url(&self) -> Result<Url> {
        let raw = match (self.base_url.trim(), self.subdomain.as_deref().map(str::trim)) {
            (base, _) if !base.is_empty() => base.to_string(),
            (_, Some(sub)) if !sub.is_empty() => format!("https://{sub}.{DEFAULT_DOMAIN}"),
            _ => {
                return Err(AmoError::Config(
                    "either base_url or subdomain must be configured".into(),
                ))
            }
        };

        let url = Url::parse(&raw)
            .map_err(|e| AmoError::Config(format!("invalid base_url '{raw}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(AmoError::Config(format!("base_url must be an http(s) origin: {raw}")));
        }
        Ok(url)
    }

    /// Check that the configuration is structurally usable.
    ///
    /// # Errors
    /// Returns `AmoError::Config` naming the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.resolved_base_url()?;

        let required = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
            ("app_name", &self.app_name),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AmoError::Config(format!("{name} must not be empty")));
            }
        }

        Url::parse(&self.redirect_uri)
            .map_err(|e| AmoError::Config(format!("invalid redirect_uri: {e}")))?;

        if self.renewal.interval_secs == 0 {
            return Err(AmoError::Config("renewal.interval_secs must be positive".into()));
        }
        let windows = [
            ("renewal.refresh_threshold_secs", self.renewal.refresh_threshold_secs),
            ("renewal.expiry_margin_secs", self.renewal.expiry_margin_secs),
        ];
        for (name, secs) in windows {
            if secs > MAX_RENEWAL_WINDOW_SECS {
                return Err(AmoError::Config(format!(
                    "{name} must not exceed {MAX_RENEWAL_WINDOW_SECS}"
                )));
            }
        }
        if self.http.timeout_secs == 0 {
            return Err(AmoError::Config("http.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for AmoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmoConfig")
            .field("base_url", &self.base_url)
            .field("subdomain", &self.subdomain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_code", &self.auth_code.as_ref().map(|_| "<redacted>"))
            .field("app_name", &self.app_name)
            .field("storage", &self.storage)
            .field("renewal", &self.renewal)
            .field("http", &self.http)
            .finish()
    }
}
