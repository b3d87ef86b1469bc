//! API constants
//!
//! Centralized location for the protocol-level constants of amoCRM API v4.

// Endpoints
pub const TOKEN_ENDPOINT_PATH: &str = "/oauth2/access_token";
pub const API_PREFIX: &str = "/api/v4";
pub const DEFAULT_DOMAIN: &str = "amocrm.ru";

// Pagination
pub const MAX_PAGE_SIZE: u32 = 250;
pub const DEFAULT_MAX_PAGES: u32 = 1000;

// Token lifecycle
pub const DEFAULT_RENEWAL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REFRESH_THRESHOLD_SECS: u64 = 300;
pub const DEFAULT_EXPIRY_MARGIN_SECS: u64 = 60;
/// Upper bound for the refresh threshold and expiry margin (one year).
pub const MAX_RENEWAL_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

// HTTP
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("amocrm-client/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_APP_NAME: &str = "default";
pub const DEFAULT_DB_PATH: &str = "amocrm_tokens.db";
