//! Custom field values
//!
//! amoCRM sends custom field values as loosely typed objects whose shape depends
//! on the declared `field_type`. They are reconstructed here into a closed
//! [`FieldValue`] union at decode time and flattened back on encode.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Values of one custom field attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomFieldValue", into = "RawCustomFieldValue")]
pub struct CustomFieldValue {
    pub field_id: i64,
    pub field_name: Option<String>,
    pub field_code: Option<String>,
    pub field_type: String,
    pub values: Vec<FieldValue>,
}

/// One typed value of a custom field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Numeric(f64),
    Checkbox(bool),
    /// Unix timestamp in seconds.
    Date(i64),
    Select { enum_id: Option<i64>, enum_code: Option<String>, value: String },
    Multitext { enum_code: Option<String>, value: String },
    Url(String),
    /// Field types without a dedicated variant keep their raw value object.
    Other(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCustomFieldValue {
    field_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_code: Option<String>,
    #[serde(default)]
    field_type: String,
    #[serde(default)]
    values: Vec<Value>,
}

impl CustomFieldValue {
    /// Value list for a single text-like field.
    pub fn text(field_id: i64, value: impl Into<String>) -> Self {
        Self {
            field_id,
            field_name: None,
            field_code: None,
            field_type: "text".into(),
            values: vec![FieldValue::Text(value.into())],
        }
    }

    /// First value, which is the only one for most field types.
    #[must_use]
    pub fn first(&self) -> Option<&FieldValue> {
        self.values.first()
    }
}

impl TryFrom<RawCustomFieldValue> for CustomFieldValue {
    type Error = String;

    fn try_from(raw: RawCustomFieldValue) -> Result<Self, Self::Error> {
        let values = raw
            .values
            .into_iter()
            .map(|value| decode_value(&raw.field_type, value))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("custom field {}: {e}", raw.field_id))?;

        Ok(Self {
            field_id: raw.field_id,
            field_name: raw.field_name,
            field_code: raw.field_code,
            field_type: raw.field_type,
            values,
        })
    }
}

impl From<CustomFieldValue> for RawCustomFieldValue {
    fn from(field: CustomFieldValue) -> Self {
        Self {
            field_id: field.field_id,
            field_name: field.field_name,
            field_code: field.field_code,
            field_type: field.field_type,
            values: field.values.into_iter().map(encode_value).collect(),
        }
    }
}

fn decode_value(field_type: &str, raw: Value) -> Result<FieldValue, String> {
    let mut object = match raw {
        Value::Object(object) => object,
        other => return Err(format!("value must be an object, got {other}")),
    };
    let value = object.remove("value").unwrap_or(Value::Null);

    let decoded = match field_type {
        "text" | "textarea" | "streetaddress" => FieldValue::Text(as_text(value)),
        "numeric" | "price" | "monetary" => FieldValue::Numeric(as_number(&value)?),
        "checkbox" => FieldValue::Checkbox(as_bool(&value)?),
        "date" | "date_time" | "birthday" => FieldValue::Date(as_timestamp(&value)?),
        "select" | "multiselect" | "radiobutton" | "category" => FieldValue::Select {
            enum_id: object.get("enum_id").and_then(Value::as_i64),
            enum_code: object.get("enum_code").and_then(Value::as_str).map(str::to_owned),
            value: as_text(value),
        },
        "multitext" => FieldValue::Multitext {
            enum_code: object.get("enum_code").and_then(Value::as_str).map(str::to_owned),
            value: as_text(value),
        },
        "url" => FieldValue::Url(as_text(value)),
        _ => {
            object.insert("value".into(), value);
            FieldValue::Other(Value::Object(object))
        }
    };
    Ok(decoded)
}

fn encode_value(value: FieldValue) -> Value {
    let mut object = Map::new();
    match value {
        FieldValue::Text(text) | FieldValue::Url(text) => {
            object.insert("value".into(), Value::String(text));
        }
        FieldValue::Numeric(number) => {
            let encoded = Number::from_f64(number).map_or(Value::Null, Value::Number);
            object.insert("value".into(), encoded);
        }
        FieldValue::Checkbox(flag) => {
            object.insert("value".into(), Value::Bool(flag));
        }
        FieldValue::Date(timestamp) => {
            object.insert("value".into(), Value::from(timestamp));
        }
        FieldValue::Select { enum_id, enum_code, value } => {
            object.insert("value".into(), Value::String(value));
            if let Some(id) = enum_id {
                object.insert("enum_id".into(), Value::from(id));
            }
            if let Some(code) = enum_code {
                object.insert("enum_code".into(), Value::String(code));
            }
        }
        FieldValue::Multitext { enum_code, value } => {
            object.insert("value".into(), Value::String(value));
            if let Some(code) = enum_code {
                object.insert("enum_code".into(), Value::String(code));
            }
        }
        FieldValue::Other(raw) => return raw,
    }
    Value::Object(object)
}

fn as_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("numeric value out of range: {n}")),
        Value::String(s) => {
            s.trim().parse::<f64>().map_err(|_| format!("expected numeric value, got '{s}'"))
        }
        other => Err(format!("expected numeric value, got {other}")),
    }
}

fn as_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(n) => Ok(n.as_i64().unwrap_or_default() != 0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "y" | "yes" => Ok(true),
            "0" | "false" | "n" | "no" | "" => Ok(false),
            _ => Err(format!("expected checkbox value, got '{s}'")),
        },
        other => Err(format!("expected checkbox value, got {other}")),
    }
}

fn as_timestamp(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| format!("expected unix timestamp, got {n}")),
        Value::String(s) => {
            if let Ok(ts) = s.trim().parse::<i64>() {
                return Ok(ts);
            }
            chrono::DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.timestamp())
                .map_err(|_| format!("expected date value, got '{s}'"))
        }
        other => Err(format!("expected date value, got {other}")),
    }
}
