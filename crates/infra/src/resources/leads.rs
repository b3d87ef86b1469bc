//! `/api/v4/leads`

use std::sync::Arc;

use amocrm_core::{api_path, ApiRequest, PaginationOptions, QueryParams, RequestExecutor};
use amocrm_domain::{AmoError, EntityType, Lead, LeadWith, Note, Result};
use tracing::instrument;

use super::notes::entity_notes;
use super::ResourceApi;

const KEY: &str = "leads";

/// Lead endpoints
#[derive(Clone)]
pub struct Leads {
    api: ResourceApi,
}

impl Leads {
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self { api: ResourceApi::new(executor) }
    }

    /// Every lead in the account.
    ///
    /// # Errors
    /// Any executor or pagination error.
    pub async fn all(&self) -> Result<Vec<Lead>> {
        self.query(QueryParams::new()).await
    }

    /// Leads matching `params`, across all pages.
    ///
    /// # Errors
    /// Any executor or pagination error.
    #[instrument(skip_all)]
    pub async fn query(&self, params: QueryParams) -> Result<Vec<Lead>> {
        let request = ApiRequest::get(api_path(KEY)).query(params);
        self.api.list(request, KEY, PaginationOptions::default()).await
    }

    /// # Errors
    /// `AmoError::NotFound` when the API answers 204.
    pub async fn by_id(&self, id: i64, with: &[LeadWith]) -> Result<Lead> {
        let request = ApiRequest::get(api_path(&format!("{KEY}/{id}")))
            .query(QueryParams::new().with(with.iter().map(LeadWith::as_str)));
        self.api.one(request).await
    }

    /// Create leads in one call; returns the created ids as partial leads.
    ///
    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch, otherwise executor errors.
    pub async fn create(&self, leads: &[Lead]) -> Result<Vec<Lead>> {
        self.api.batch(ApiRequest::post(api_path(KEY)), KEY, leads).await
    }

    /// Update leads in one call. Every lead must carry its `id`.
    ///
    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch or a lead without id.
    pub async fn update(&self, leads: &[Lead]) -> Result<Vec<Lead>> {
        if leads.iter().any(|lead| lead.id.is_none()) {
            return Err(AmoError::InvalidInput("every updated lead needs an id".into()));
        }
        self.api.batch(ApiRequest::patch(api_path(KEY)), KEY, leads).await
    }

    /// Notes attached to one lead.
    ///
    /// # Errors
    /// Any executor or pagination error.
    pub async fn notes(&self, lead_id: i64) -> Result<Vec<Note>> {
        entity_notes(&self.api, EntityType::Leads, lead_id).await
    }
}
