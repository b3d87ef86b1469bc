//! Port interface for issuing API calls

use amocrm_domain::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::request::{ApiRequest, ResponseBody};

/// Sends one authenticated API call and classifies the response
///
/// Implementations never retry: transport failures, problem responses and
/// undecodable bodies are surfaced to the caller as-is.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Execute `request` and return the raw 2xx body
    ///
    /// # Errors
    /// - `AmoError::Transport` on connection problems or timeouts
    /// - `AmoError::Api` for non-2xx responses with a problem body
    /// - `AmoError::Decode` when a problem body cannot be decoded
    /// - `AmoError::NotAuthenticated` when no access token is available
    async fn execute_raw(&self, request: &ApiRequest) -> Result<ResponseBody>;
}

/// Typed helpers on top of [`RequestExecutor`]
#[async_trait]
pub trait RequestExecutorExt: RequestExecutor {
    /// Execute and decode the body; `None` for HTTP 204
    ///
    /// # Errors
    /// Everything [`RequestExecutor::execute_raw`] returns, plus
    /// `AmoError::Decode` when the body does not match `T`.
    async fn execute<T>(&self, request: &ApiRequest) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.execute_raw(request).await?.decode()
    }

    /// Execute and decode into `destination`
    ///
    /// HTTP 204 leaves `destination` untouched.
    ///
    /// # Errors
    /// Same as [`RequestExecutorExt::execute`].
    async fn execute_into<T>(&self, request: &ApiRequest, destination: &mut T) -> Result<()>
    where
        T: DeserializeOwned + Send,
    {
        if let Some(decoded) = self.execute(request).await? {
            *destination = decoded;
        }
        Ok(())
    }
}

impl<E: RequestExecutor + ?Sized> RequestExecutorExt for E {}
