//! Token store adapters

mod memory_token_store;
mod sqlite_token_store;

pub use memory_token_store::MemoryTokenStore;
pub use sqlite_token_store::SqliteTokenStore;
