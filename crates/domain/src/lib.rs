//! # amoCRM Domain
//!
//! Data types and models for the amoCRM API v4 client.
//!
//! This crate contains:
//! - The `AmoError` taxonomy and `Result` alias
//! - OAuth2 credential types (authorization records, grants, access tokens)
//! - Response envelopes and problem bodies
//! - Configuration structures
//! - Resource records (leads, contacts, tasks, notes, catalogs, tags, custom fields)
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
