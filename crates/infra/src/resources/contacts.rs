//! `/api/v4/contacts`
//!
//! Contact listings follow the absolute `next` links the API returns.

use std::sync::Arc;

use amocrm_core::{api_path, ApiRequest, PaginationOptions, QueryParams, RequestExecutor};
use amocrm_domain::{AmoError, Contact, ContactWith, EntityType, Note, Result};
use tracing::instrument;

use super::notes::entity_notes;
use super::ResourceApi;

const KEY: &str = "contacts";

/// Contact endpoints
#[derive(Clone)]
pub struct Contacts {
    api: ResourceApi,
}

impl Contacts {
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self { api: ResourceApi::new(executor) }
    }

    /// # Errors
    /// Any executor or pagination error.
    pub async fn all(&self) -> Result<Vec<Contact>> {
        self.query(QueryParams::new()).await
    }

    /// # Errors
    /// Any executor or pagination error.
    #[instrument(skip_all)]
    pub async fn query(&self, params: QueryParams) -> Result<Vec<Contact>> {
        let request = ApiRequest::get(api_path(KEY)).query(params);
        self.api.list(request, KEY, PaginationOptions::next_link()).await
    }

    /// # Errors
    /// `AmoError::NotFound` when the API answers 204.
    pub async fn by_id(&self, id: i64, with: &[ContactWith]) -> Result<Contact> {
        let request = ApiRequest::get(api_path(&format!("{KEY}/{id}")))
            .query(QueryParams::new().with(with.iter().map(ContactWith::as_str)));
        self.api.one(request).await
    }

    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch, otherwise executor errors.
    pub async fn create(&self, contacts: &[Contact]) -> Result<Vec<Contact>> {
        self.api.batch(ApiRequest::post(api_path(KEY)), KEY, contacts).await
    }

    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch or a contact without id.
    pub async fn update(&self, contacts: &[Contact]) -> Result<Vec<Contact>> {
        if contacts.iter().any(|contact| contact.id.is_none()) {
            return Err(AmoError::InvalidInput("every updated contact needs an id".into()));
        }
        self.api.batch(ApiRequest::patch(api_path(KEY)), KEY, contacts).await
    }

    /// # Errors
    /// Any executor or pagination error.
    pub async fn notes(&self, contact_id: i64) -> Result<Vec<Note>> {
        entity_notes(&self.api, EntityType::Contacts, contact_id).await
    }
}
