//! Typed wrappers over the API v4 resource endpoints
//!
//! Every wrapper shares one [`RequestExecutor`]; list calls go through the
//! [`Paginator`] and batch writes decode the `_embedded` collection the API
//! echoes back.

mod catalogs;
mod contacts;
mod leads;
mod notes;
mod tasks;

use std::sync::Arc;

use amocrm_core::{ApiRequest, PaginationOptions, Paginator, RequestExecutor, RequestExecutorExt};
use amocrm_domain::{AmoError, ListEnvelope, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use catalogs::Catalogs;
pub use contacts::Contacts;
pub use leads::Leads;
pub use notes::Notes;
pub use tasks::{TaskFilter, Tasks};

/// Executor plus paginator, shared by all resource wrappers
#[derive(Clone)]
pub(crate) struct ResourceApi {
    executor: Arc<dyn RequestExecutor>,
    paginator: Paginator<dyn RequestExecutor>,
}

impl ResourceApi {
    pub(crate) fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        let paginator = Paginator::new(Arc::clone(&executor));
        Self { executor, paginator }
    }

    pub(crate) async fn list<T>(
        &self,
        request: ApiRequest,
        key: &str,
        options: PaginationOptions,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.paginator.collect(request, key, options).await
    }

    /// Single entity; 204 means the entity does not exist.
    pub(crate) async fn one<T>(&self, request: ApiRequest) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let target = request.target().to_owned();
        self.executor
            .execute(&request)
            .await?
            .ok_or_else(|| AmoError::NotFound(format!("no content at {target}")))
    }

    /// Send a JSON array and return the echoed `_embedded.{key}` items.
    pub(crate) async fn batch<T, B>(
        &self,
        request: ApiRequest,
        key: &str,
        items: &[B],
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync,
    {
        if items.is_empty() {
            return Err(AmoError::InvalidInput(format!("no {key} to send")));
        }
        let request = request.json(items)?;
        match self.executor.execute::<ListEnvelope>(&request).await? {
            Some(mut envelope) => envelope.take_items(key),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) async fn send(&self, request: ApiRequest) -> Result<()> {
        self.executor.execute_raw(&request).await.map(drop)
    }
}
