//! Entity kinds shared by tasks, notes and links

use serde::{Deserialize, Serialize};

use crate::impl_wire_conversions;

/// Top-level entity collections that tasks and notes can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Leads,
    Contacts,
    Companies,
    Customers,
}

impl_wire_conversions!(EntityType {
    Leads => "leads",
    Contacts => "contacts",
    Companies => "companies",
    Customers => "customers",
});

/// Sort direction for `order[...]` query keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl_wire_conversions!(SortDirection {
    Asc => "asc",
    Desc => "desc",
});

/// `_links.self` of a single entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfLink {
    #[serde(rename = "self", default)]
    pub current: crate::types::envelope::Link,
}
