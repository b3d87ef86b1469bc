//! Logging setup
//!
//! Installs a global `tracing` subscriber: an [`EnvFilter`] (from `RUST_LOG`
//! or the configured level) plus a human-readable or JSON fmt layer.
//!
//! The client itself only emits `tracing` events; calling [`LoggingConfig::init`]
//! is optional and only one subscriber is ever installed per process.

use std::env;
use std::io;

use amocrm_domain::{AmoError, Result};
use once_cell::sync::OnceCell;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line output for development
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
    /// Single-line output
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into(), format: LogFormat::Pretty, include_location: false }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT` (`json`, `compact`, `pretty`) and
    /// `LOG_INCLUDE_LOCATION`.
    #[must_use]
    pub fn from_env() -> Self {
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format,
            include_location: env::var("LOG_INCLUDE_LOCATION").is_ok(),
        }
    }

    /// Build the filter: `RUST_LOG` if set, else `level`, with HTTP stack
    /// noise capped at `warn`.
    fn filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").map_or_else(
            |_| EnvFilter::new(&self.level),
            |directive| EnvFilter::new(directive),
        );

        ["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"]
            .into_iter()
            .filter_map(|d| d.parse().ok())
            .fold(base, EnvFilter::add_directive)
    }

    /// Install the global subscriber.
    ///
    /// Repeated calls are no-ops once a subscriber from this module is in
    /// place.
    ///
    /// # Errors
    /// Returns `AmoError::Config` if another global subscriber was installed
    /// elsewhere first.
    pub fn init(&self) -> Result<()> {
        if INSTALLED.get().is_some() {
            return Ok(());
        }

        let registry = tracing_subscriber::registry().with(self.filter());
        let layer = fmt::layer()
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_target(true)
            .with_writer(io::stderr);

        let installed = match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init(),
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            LogFormat::Compact => registry.with(layer.compact()).try_init(),
        };
        installed.map_err(|e| AmoError::Config(format!("tracing subscriber: {e}")))?;

        let _ = INSTALLED.set(self.format);
        tracing::debug!(level = %self.level, format = ?self.format, "logging initialised");
        Ok(())
    }
}

/// Install logging from the environment with `default_level` as fallback.
///
/// # Errors
/// See [`LoggingConfig::init`].
pub fn init_tracing(default_level: &str) -> Result<()> {
    let mut config = LoggingConfig::from_env();
    if env::var("RUST_LOG").is_err() {
        config.level = default_level.to_string();
    }
    config.init()
}
