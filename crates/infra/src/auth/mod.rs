//! OAuth2 adapters

mod grant_client;

pub use grant_client::OAuthGrantClient;
