//! Infrastructure error handling

mod conversions;

pub use conversions::{into_domain, InfraError};
