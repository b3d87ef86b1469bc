//! `/api/v4/{entity_type}/notes`

use std::sync::Arc;

use amocrm_core::{api_path, ApiRequest, PaginationOptions, RequestExecutor};
use amocrm_domain::{AmoError, EntityType, Note, Result};
use tracing::instrument;

use super::ResourceApi;

const KEY: &str = "notes";

/// Note endpoints for any entity type
#[derive(Clone)]
pub struct Notes {
    api: ResourceApi,
}

impl Notes {
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self { api: ResourceApi::new(executor) }
    }

    /// Every note of one entity.
    ///
    /// # Errors
    /// Any executor or pagination error.
    pub async fn for_entity(&self, entity_type: EntityType, entity_id: i64) -> Result<Vec<Note>> {
        entity_notes(&self.api, entity_type, entity_id).await
    }

    /// Create notes on entities of one type; each note names its
    /// `entity_id`.
    ///
    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch or a note without
    /// `entity_id`.
    pub async fn create_for(&self, entity_type: EntityType, notes: &[Note]) -> Result<Vec<Note>> {
        if notes.iter().any(|note| note.entity_id.is_none()) {
            return Err(AmoError::InvalidInput("every note needs an entity_id".into()));
        }
        let request = ApiRequest::post(api_path(&format!("{entity_type}/{KEY}")));
        self.api.batch(request, KEY, notes).await
    }

    /// # Errors
    /// Any executor error.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        note_id: i64,
    ) -> Result<()> {
        let path = api_path(&format!("{entity_type}/{entity_id}/{KEY}/{note_id}"));
        self.api.send(ApiRequest::delete(path)).await
    }
}

pub(super) async fn entity_notes(
    api: &ResourceApi,
    entity_type: EntityType,
    entity_id: i64,
) -> Result<Vec<Note>> {
    let request = ApiRequest::get(api_path(&format!("{entity_type}/{entity_id}/{KEY}")));
    api.list(request, KEY, PaginationOptions::default()).await
}
