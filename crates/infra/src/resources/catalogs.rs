//! `/api/v4/catalogs` and catalog elements

use std::sync::Arc;

use amocrm_core::{api_path, ApiRequest, PaginationOptions, QueryParams, RequestExecutor};
use amocrm_domain::{Catalog, CatalogElement, Result};
use tracing::instrument;

use super::ResourceApi;

const KEY: &str = "catalogs";
const ELEMENTS: &str = "elements";

/// Catalog (list) endpoints
#[derive(Clone)]
pub struct Catalogs {
    api: ResourceApi,
}

impl Catalogs {
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self { api: ResourceApi::new(executor) }
    }

    /// # Errors
    /// Any executor or pagination error.
    pub async fn all(&self) -> Result<Vec<Catalog>> {
        let request = ApiRequest::get(api_path(KEY));
        self.api.list(request, KEY, PaginationOptions::default()).await
    }

    /// # Errors
    /// `AmoError::NotFound` when the API answers 204.
    pub async fn by_id(&self, id: i64) -> Result<Catalog> {
        self.api.one(ApiRequest::get(api_path(&format!("{KEY}/{id}")))).await
    }

    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch, otherwise executor errors.
    pub async fn create(&self, catalogs: &[Catalog]) -> Result<Vec<Catalog>> {
        self.api.batch(ApiRequest::post(api_path(KEY)), KEY, catalogs).await
    }

    /// Elements of one catalog matching `params`, across all pages.
    ///
    /// # Errors
    /// Any executor or pagination error.
    #[instrument(skip(self, params))]
    pub async fn elements(
        &self,
        catalog_id: i64,
        params: QueryParams,
    ) -> Result<Vec<CatalogElement>> {
        let request = ApiRequest::get(elements_path(catalog_id)).query(params);
        self.api.list(request, ELEMENTS, PaginationOptions::default()).await
    }

    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch, otherwise executor errors.
    pub async fn create_elements(
        &self,
        catalog_id: i64,
        elements: &[CatalogElement],
    ) -> Result<Vec<CatalogElement>> {
        self.api.batch(ApiRequest::post(elements_path(catalog_id)), ELEMENTS, elements).await
    }
}

fn elements_path(catalog_id: i64) -> String {
    api_path(&format!("{KEY}/{catalog_id}/{ELEMENTS}"))
}
