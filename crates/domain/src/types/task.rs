//! Task records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{EntityType, SelfLink};
use crate::impl_wire_conversions;

/// Built-in task type for a call.
pub const TASK_TYPE_CALL: i64 = 1;
/// Built-in task type for a meeting.
pub const TASK_TYPE_MEETING: i64 = 2;

/// Task as returned by and sent to `/api/v4/tasks`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<i64>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub complete_till: Option<DateTime<Utc>>,
    /// Echoed back unchanged by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(rename = "_links", default, skip_serializing)]
    pub links: Option<SelfLink>,
}

/// Completion result of a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub text: String,
}

/// Sortable task fields for `order[...]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOrderField {
    CreatedAt,
    CompleteTill,
    Id,
}

impl_wire_conversions!(TaskOrderField {
    CreatedAt => "created_at",
    CompleteTill => "complete_till",
    Id => "id",
});

impl Task {
    /// New task attached to an entity.
    pub fn for_entity(
        entity_type: EntityType,
        entity_id: i64,
        text: impl Into<String>,
        complete_till: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
            text: Some(text.into()),
            complete_till: Some(complete_till),
            ..Self::default()
        }
    }

    /// Minimal PATCH body that marks the task as done with a result text.
    #[must_use]
    pub fn completion(result: impl Into<String>) -> Self {
        Self {
            is_completed: Some(true),
            result: Some(TaskResult { text: result.into() }),
            ..Self::default()
        }
    }
}
