//! OAuth2 token lifecycle

pub mod manager;
pub mod ports;
pub mod renewal;

pub use manager::{AuthManager, RenewalOutcome, RenewalSettings};
pub use ports::{AccessTokenProvider, GrantClient, TokenStore};
pub use renewal::RenewalHandle;
