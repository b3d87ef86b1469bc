//! # amoCRM Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest HTTP client, token endpoint client and request executor
//! - Token stores (SQLite via r2d2, in-memory)
//! - Configuration loading and logging setup
//! - Typed resource wrappers and the [`AmoClient`] facade
//!
//! ## Architecture
//! - Implements traits defined in `amocrm-core`
//! - Contains all "impure" code (network, disk, environment)

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod resources;
pub mod storage;

// Re-export commonly used items
pub use api::HttpRequestExecutor;
pub use auth::OAuthGrantClient;
pub use client::{AmoClient, ClientAuthManager};
pub use errors::{into_domain, InfraError};
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat, LoggingConfig};
pub use resources::{Catalogs, Contacts, Leads, Notes, TaskFilter, Tasks};
pub use storage::{MemoryTokenStore, SqliteTokenStore};
