//! Notes attached to leads, contacts, companies and customers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::SelfLink;

/// Kind of note
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    Common,
    CallIn,
    CallOut,
    ServiceMessage,
    ExtendedServiceMessage,
    MessageCashier,
    InvoicePaid,
    Geolocation,
    SmsIn,
    SmsOut,
    Attachment,
    /// Any note type this client does not model.
    #[serde(other)]
    Unknown,
}

/// Status of a `message_cashier` note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashierStatus {
    Created,
    Shown,
    Canceled,
}

/// Type-specific note payload; only the fields relevant to the note type are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CashierStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

/// Note as returned by and sent to `/api/v4/{entity}/notes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
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
    pub note_type: NoteType,
    #[serde(default)]
    pub params: NoteParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(rename = "_links", default, skip_serializing)]
    pub links: Option<SelfLink>,
}

impl Note {
    /// Plain text note for an entity.
    pub fn common(entity_id: i64, text: impl Into<String>) -> Self {
        Self {
            id: None,
            entity_id: Some(entity_id),
            created_by: None,
            updated_by: None,
            created_at: None,
            updated_at: None,
            responsible_user_id: None,
            group_id: None,
            note_type: NoteType::Common,
            params: NoteParams { text: Some(text.into()), ..NoteParams::default() },
            account_id: None,
            links: None,
        }
    }
}
