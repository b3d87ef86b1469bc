//! Lead (deal) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::custom_field::CustomFieldValue;
use super::entity::SelfLink;
use super::tag::Tag;
use crate::impl_wire_conversions;

/// Lead as returned by and sent to `/api/v4/leads`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_reason_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
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
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub closest_task_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields_values: Option<Vec<CustomFieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    /// Only present when requested with [`LeadWith::IsPriceModifiedByRobot`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_price_modified_by_robot: Option<bool>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<LeadEmbedded>,
    #[serde(rename = "_links", default, skip_serializing)]
    pub links: Option<SelfLink>,
}

/// Related entities embedded in a lead
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadEmbedded {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<LinkedContact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<LinkedEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog_elements: Vec<LinkedCatalogElement>,
}

/// Contact reference inside a lead
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedContact {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_main: Option<bool>,
}

/// Bare id reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedEntity {
    pub id: i64,
}

/// Catalog element reference inside a lead
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedCatalogElement {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<i64>,
}

/// Extra data that can be requested with `with=` on lead endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadWith {
    CatalogElements,
    IsPriceModifiedByRobot,
    LossReason,
    Contacts,
    OnlyDeleted,
    SourceId,
}

impl_wire_conversions!(LeadWith {
    CatalogElements => "catalog_elements",
    IsPriceModifiedByRobot => "is_price_modified_by_robot",
    LossReason => "loss_reason",
    Contacts => "contacts",
    OnlyDeleted => "only_deleted",
    SourceId => "source_id",
});

impl Lead {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    /// Tags embedded in the lead, empty when none were returned.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        self.embedded.as_ref().map(|e| e.tags.as_slice()).unwrap_or_default()
    }
}
