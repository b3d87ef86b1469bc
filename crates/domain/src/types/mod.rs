//! Domain types and models

pub mod auth;
pub mod catalog;
pub mod contact;
pub mod custom_field;
pub mod entity;
pub mod envelope;
pub mod lead;
pub mod note;
pub mod tag;
pub mod task;

pub use auth::{
    AccessToken, AuthHealth, AuthState, AuthorizationRecord, GrantRequest, GrantType, TokenGrant,
};
pub use catalog::{Catalog, CatalogElement, CatalogType};
pub use contact::{Contact, ContactEmbedded, ContactWith};
pub use custom_field::{CustomFieldValue, FieldValue};
pub use entity::{EntityType, SelfLink, SortDirection};
pub use envelope::{FieldViolation, Link, Links, ListEnvelope, ProblemDetails, ValidationEntry};
pub use lead::{Lead, LeadEmbedded, LeadWith, LinkedCatalogElement, LinkedContact, LinkedEntity};
pub use note::{CashierStatus, Note, NoteParams, NoteType};
pub use tag::Tag;
pub use task::{Task, TaskOrderField, TaskResult, TASK_TYPE_CALL, TASK_TYPE_MEETING};
