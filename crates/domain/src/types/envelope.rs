//! Response envelopes shared by every API v4 collection
//!
//! Successful list responses look like
//! `{"_page": 1, "_links": {"self": {...}, "next": {...}}, "_embedded": {"leads": [...]}}`
//! and failures carry a problem body with optional per-field violations.

use std::fmt::Write as _;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AmoError, Result};

/// Single navigation link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: String,
}

/// Navigation links of a collection page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<Link>,
}

impl Links {
    /// The next-page link, if present and non-empty.
    #[must_use]
    pub fn next_href(&self) -> Option<&str> {
        self.next.as_ref().map(|l| l.href.as_str()).filter(|href| !href.is_empty())
    }

    #[must_use]
    pub fn self_href(&self) -> Option<&str> {
        self.current.as_ref().map(|l| l.href.as_str()).filter(|href| !href.is_empty())
    }
}

/// Raw collection envelope; the embedded payload is keyed by resource name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEnvelope {
    #[serde(rename = "_page", default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(rename = "_embedded", default)]
    pub embedded: Map<String, Value>,
}

impl ListEnvelope {
    /// Decode an envelope from a JSON body.
    ///
    /// # Errors
    /// Returns `AmoError::Decode` if the body is not an envelope.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| AmoError::Decode(format!("invalid envelope: {e}")))
    }

    /// Remove and decode the embedded collection named `key`.
    ///
    /// A missing key is an empty collection.
    ///
    /// # Errors
    /// Returns `AmoError::Decode` if the items do not match `T`.
    pub fn take_items<T: DeserializeOwned>(&mut self, key: &str) -> Result<Vec<T>> {
        match self.embedded.remove(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| AmoError::Decode(format!("invalid '{key}' collection: {e}"))),
        }
    }
}

/// One per-field violation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub detail: String,
}

/// Entry of `validation-errors`.
///
/// Batch endpoints group violations per request item; some endpoints list
/// violations directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationEntry {
    Grouped {
        #[serde(default, deserialize_with = "lenient_opt_string")]
        request_id: Option<String>,
        errors: Vec<FieldViolation>,
    },
    Single(FieldViolation),
}

/// Structured problem body returned with non-2xx statuses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: String,
    #[serde(rename = "validation-errors", default)]
    pub validation_errors: Vec<ValidationEntry>,
}

impl ProblemDetails {
    /// Every violation, flattened across groups, in document order.
    pub fn violations(&self) -> impl Iterator<Item = &FieldViolation> {
        self.validation_errors.iter().flat_map(|entry| match entry {
            ValidationEntry::Grouped { errors, .. } => errors.iter().collect::<Vec<_>>(),
            ValidationEntry::Single(violation) => vec![violation],
        })
    }

    /// Single human-readable message: `"{title}: {path} — {code}: {detail}; ..."`.
    ///
    /// Without violations the problem `detail` follows the title instead.
    #[must_use]
    pub fn compose_message(&self) -> String {
        let title = if self.title.is_empty() { "Request failed" } else { self.title.as_str() };
        let mut message = String::from(title);

        let mut violations = self.violations().peekable();
        if violations.peek().is_none() {
            if !self.detail.is_empty() {
                let _ = write!(message, ": {}", self.detail);
            }
            return message;
        }

        message.push_str(": ");
        for (index, violation) in violations.enumerate() {
            if index > 0 {
                message.push_str("; ");
            }
            let _ = write!(message, "{} — {}: {}", violation.path, violation.code, violation.detail);
        }
        message
    }
}

/// Accept string or number codes.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
