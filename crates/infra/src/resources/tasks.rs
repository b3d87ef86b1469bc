//! `/api/v4/tasks`

use std::sync::Arc;

use amocrm_core::{api_path, ApiRequest, PaginationOptions, QueryParams, RequestExecutor};
use amocrm_domain::{AmoError, EntityType, Result, SortDirection, Task, TaskOrderField};
use chrono::{DateTime, Utc};
use tracing::instrument;

use super::ResourceApi;

const KEY: &str = "tasks";

/// Filters accepted by the task list endpoint
///
/// `entity_ids` only narrows the result when `entity_type` is set as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub ids: Vec<i64>,
    pub responsible_user_ids: Vec<i64>,
    pub is_completed: Option<bool>,
    pub task_type_ids: Vec<i64>,
    pub entity_type: Option<EntityType>,
    pub entity_ids: Vec<i64>,
    pub updated_from: Option<DateTime<Utc>>,
    pub updated_to: Option<DateTime<Utc>>,
    pub order: Option<(TaskOrderField, SortDirection)>,
    /// Page size; the paginator's default applies when unset.
    pub limit: Option<u32>,
}

impl TaskFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_entity(entity_type: EntityType, entity_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_ids: entity_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.is_completed = Some(completed);
        self
    }

    #[must_use]
    pub fn responsible(mut self, user_ids: impl IntoIterator<Item = i64>) -> Self {
        self.responsible_user_ids.extend(user_ids);
        self
    }

    #[must_use]
    pub fn updated_between(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.updated_from = from;
        self.updated_to = to;
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: TaskOrderField, direction: SortDirection) -> Self {
        self.order = Some((field, direction));
        self
    }

    /// Render as query parameters
    ///
    /// # Errors
    /// `AmoError::InvalidInput` when `entity_ids` are given without an
    /// `entity_type`.
    pub fn to_query(&self) -> Result<QueryParams> {
        if !self.entity_ids.is_empty() && self.entity_type.is_none() {
            return Err(AmoError::InvalidInput(
                "filtering tasks by entity id requires an entity type".into(),
            ));
        }

        let mut query = QueryParams::new()
            .filter_any("id", &self.ids)
            .filter_any("responsible_user_id", &self.responsible_user_ids)
            .filter_any("task_type", &self.task_type_ids);

        if let Some(completed) = self.is_completed {
            query = query.filter("is_completed", u8::from(completed));
        }
        if let Some(entity_type) = self.entity_type {
            query =
                query.filter("entity_type", entity_type).filter_any("entity_id", &self.entity_ids);
        }
        if self.updated_from.is_some() || self.updated_to.is_some() {
            query = query.filter_range(
                "updated_at",
                self.updated_from.map(|t| t.timestamp()),
                self.updated_to.map(|t| t.timestamp()),
            );
        }
        if let Some((field, direction)) = self.order {
            query = query.order(field.as_str(), direction);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        Ok(query)
    }
}

/// Task endpoints
#[derive(Clone)]
pub struct Tasks {
    api: ResourceApi,
}

impl Tasks {
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self { api: ResourceApi::new(executor) }
    }

    /// # Errors
    /// Any executor or pagination error.
    pub async fn all(&self) -> Result<Vec<Task>> {
        self.query(&TaskFilter::default()).await
    }

    /// # Errors
    /// `AmoError::InvalidInput` for an inconsistent filter, otherwise any
    /// executor or pagination error.
    #[instrument(skip_all)]
    pub async fn query(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let request = ApiRequest::get(api_path(KEY)).query(filter.to_query()?);
        self.api.list(request, KEY, PaginationOptions::default()).await
    }

    /// # Errors
    /// `AmoError::NotFound` when the API answers 204.
    pub async fn by_id(&self, id: i64) -> Result<Task> {
        self.api.one(ApiRequest::get(api_path(&format!("{KEY}/{id}")))).await
    }

    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch, otherwise executor errors.
    pub async fn create(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        self.api.batch(ApiRequest::post(api_path(KEY)), KEY, tasks).await
    }

    /// # Errors
    /// `AmoError::InvalidInput` for an empty batch or a task without id.
    pub async fn update(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        if tasks.iter().any(|task| task.id.is_none()) {
            return Err(AmoError::InvalidInput("every updated task needs an id".into()));
        }
        self.api.batch(ApiRequest::patch(api_path(KEY)), KEY, tasks).await
    }

    /// PATCH a single task by its id.
    ///
    /// # Errors
    /// `AmoError::InvalidInput` when the task has no id.
    pub async fn update_one(&self, task: &Task) -> Result<Task> {
        let id = task
            .id
            .ok_or_else(|| AmoError::InvalidInput("updated task needs an id".into()))?;
        self.patch(id, task).await
    }

    /// Mark a task done with a result text.
    ///
    /// # Errors
    /// Any executor error.
    pub async fn complete(&self, id: i64, result: &str) -> Result<Task> {
        self.patch(id, &Task::completion(result)).await
    }

    async fn patch(&self, id: i64, body: &Task) -> Result<Task> {
        let request = ApiRequest::patch(api_path(&format!("{KEY}/{id}"))).json(body)?;
        self.api.one(request).await
    }
}
