//! # amoCRM Core
//!
//! Pure orchestration layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for token persistence, grant exchange and
//!   request execution
//! - The OAuth2 token lifecycle (`AuthManager`) and its renewal task
//! - Request building (`ApiRequest`, `QueryParams`) and pagination
//!
//! ## Architecture Principles
//! - Only depends on `amocrm-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod api;
pub mod auth;

pub use api::{
    api_path, ApiRequest, HttpMethod, PageStyle, PaginationOptions, Paginator, QueryParams,
    RequestExecutor, RequestExecutorExt, ResponseBody,
};
pub use auth::{
    AccessTokenProvider, AuthManager, GrantClient, RenewalHandle, RenewalOutcome, RenewalSettings,
    TokenStore,
};
