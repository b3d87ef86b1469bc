//! amoCRM API v4 transport
//!
//! # Architecture
//!
//! - Uses the shared [`crate::http::HttpClient`] (no direct reqwest clients)
//! - Bearer token from any [`amocrm_core::AccessTokenProvider`]
//! - No retries or backoff at this layer

pub mod executor;

pub use executor::HttpRequestExecutor;
