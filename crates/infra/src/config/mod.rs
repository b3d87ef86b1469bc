//! Configuration loading
//!
//! Builds an [`amocrm_domain::AmoConfig`] from environment variables, `.env`
//! files, or TOML/JSON config files.

pub mod loader;

pub use loader::{load, load_dotenv, load_from_env, load_from_file, probe_config_paths};
