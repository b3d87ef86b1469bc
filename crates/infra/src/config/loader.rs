//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `AMOCRM_BASE_URL`: Account URL (or `AMOCRM_SUBDOMAIN`)
//! - `AMOCRM_CLIENT_ID`, `AMOCRM_CLIENT_SECRET`, `AMOCRM_REDIRECT_URI`:
//!   integration credentials (required)
//! - `AMOCRM_AUTH_CODE`: One-time authorization code
//! - `AMOCRM_APP_NAME`: Key of the stored authorization record
//! - `AMOCRM_DB_PATH`, `AMOCRM_DB_POOL_SIZE`: Token store location and pool
//! - `AMOCRM_RENEWAL_INTERVAL`, `AMOCRM_REFRESH_THRESHOLD`: seconds
//! - `AMOCRM_HTTP_TIMEOUT`: seconds
//!
//! ## File Locations
//! 1. `./amocrm.{toml,json}` or `./config.{toml,json}`
//! 2. The same names one and two directories up
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use amocrm_domain::{AmoConfig, AmoError, Result};

const FILE_NAMES: [&str; 4] = ["amocrm.toml", "amocrm.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `AmoError::Config` if neither source yields a valid configuration.
pub fn load() -> Result<AmoConfig> {
    load_dotenv();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Read `.env` from the working directory (or a parent) if present.
///
/// Variables already set in the process environment are not overridden.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }
}

/// Load configuration from `AMOCRM_*` environment variables
///
/// # Errors
/// Returns `AmoError::Config` if required variables are missing, numbers do
/// not parse, or the assembled configuration fails validation.
pub fn load_from_env() -> Result<AmoConfig> {
    let base_url = optional_var("AMOCRM_BASE_URL");
    let subdomain = optional_var("AMOCRM_SUBDOMAIN");
    if base_url.is_none() && subdomain.is_none() {
        return Err(AmoError::Config(
            "Missing required environment variable: AMOCRM_BASE_URL or AMOCRM_SUBDOMAIN".into(),
        ));
    }

    let mut config = AmoConfig::new(
        base_url.unwrap_or_default(),
        env_var("AMOCRM_CLIENT_ID")?,
        env_var("AMOCRM_CLIENT_SECRET")?,
        env_var("AMOCRM_REDIRECT_URI")?,
    );
    config.subdomain = subdomain;
    config.auth_code = optional_var("AMOCRM_AUTH_CODE");

    if let Some(app_name) = optional_var("AMOCRM_APP_NAME") {
        config.app_name = app_name;
    }
    if let Some(path) = optional_var("AMOCRM_DB_PATH") {
        config.storage.path = path;
    }
    if let Some(size) = env_parse("AMOCRM_DB_POOL_SIZE")? {
        config.storage.pool_size = size;
    }
    if let Some(secs) = env_parse("AMOCRM_RENEWAL_INTERVAL")? {
        config.renewal.interval_secs = secs;
    }
    if let Some(secs) = env_parse("AMOCRM_REFRESH_THRESHOLD")? {
        config.renewal.refresh_threshold_secs = secs;
    }
    if let Some(secs) = env_parse("AMOCRM_HTTP_TIMEOUT")? {
        config.http.timeout_secs = secs;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `AmoError::Config` if the file is missing, cannot be parsed, or
/// fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AmoConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AmoError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AmoError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AmoError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse by file extension (`.toml` or `.json`).
fn parse_config(contents: &str, path: &Path) -> Result<AmoConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AmoError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AmoError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AmoError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    optional_var(key)
        .ok_or_else(|| AmoError::Config(format!("Missing required environment variable: {key}")))
}

/// Unset and blank are the same thing here.
fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_var(key)
        .map(|raw| raw.parse::<T>().map_err(|e| AmoError::Config(format!("Invalid {key}: {e}"))))
        .transpose()
}
