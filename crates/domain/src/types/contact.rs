//! Contact records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::custom_field::CustomFieldValue;
use super::entity::SelfLink;
use super::lead::{LinkedCatalogElement, LinkedEntity};
use super::tag::Tag;
use crate::impl_wire_conversions;

/// Contact as returned by and sent to `/api/v4/contacts`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
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
    pub closest_task_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields_values: Option<Vec<CustomFieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<ContactEmbedded>,
    #[serde(rename = "_links", default, skip_serializing)]
    pub links: Option<SelfLink>,
}

/// Related entities embedded in a contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactEmbedded {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leads: Vec<LinkedEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customers: Vec<LinkedEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<LinkedEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog_elements: Vec<LinkedCatalogElement>,
}

/// Extra data that can be requested with `with=` on contact endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactWith {
    Leads,
    Customers,
    CatalogElements,
}

impl_wire_conversions!(ContactWith {
    Leads => "leads",
    Customers => "customers",
    CatalogElements => "catalog_elements",
});

impl Contact {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    /// Values of the custom field with the given code (e.g. `PHONE`).
    #[must_use]
    pub fn field_by_code(&self, code: &str) -> Option<&CustomFieldValue> {
        self.custom_fields_values
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|field| field.field_code.as_deref() == Some(code))
    }
}
