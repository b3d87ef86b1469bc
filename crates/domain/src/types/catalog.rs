//! Catalogs (lists) and their elements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::custom_field::CustomFieldValue;
use super::entity::SelfLink;
use crate::impl_wire_conversions;

/// Kind of catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogType {
    Regular,
    Invoices,
    Products,
}

impl_wire_conversions!(CatalogType {
    Regular => "regular",
    Invoices => "invoices",
    Products => "products",
});

/// Catalog as returned by and sent to `/api/v4/catalogs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
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
    pub sort: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub catalog_type: Option<CatalogType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_add_elements: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_show_in_cards: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_link_multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_be_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_widget_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(rename = "_links", default, skip_serializing)]
    pub links: Option<SelfLink>,
}

/// Element of a catalog (`/api/v4/catalogs/{id}/elements`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
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
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields_values: Option<Vec<CustomFieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    /// Printable invoice link, returned for `with=invoice_link`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_link: Option<String>,
    #[serde(rename = "_links", default, skip_serializing)]
    pub links: Option<SelfLink>,
}

impl Catalog {
    pub fn new(name: impl Into<String>, catalog_type: CatalogType) -> Self {
        Self { name: Some(name.into()), catalog_type: Some(catalog_type), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn catalog_type_uses_type_key() {
        let catalog = Catalog::new("Products", CatalogType::Products);
        assert_eq!(
            serde_json::to_value(&catalog).unwrap(),
            json!({"name": "Products", "type": "products"})
        );
    }

    #[test]
    fn element_decodes_custom_fields() {
        let element: CatalogElement = serde_json::from_value(json!({
            "id": 1, "catalog_id": 9, "name": "Widget",
            "custom_fields_values": [{"field_id": 3, "field_type": "price", "values": [{"value": 19.9}]}]
        }))
        .unwrap();
        assert_eq!(element.catalog_id, Some(9));
        assert_eq!(element.custom_fields_values.unwrap()[0].field_type, "price");
    }
}
