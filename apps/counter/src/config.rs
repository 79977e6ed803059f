//! Counter configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! ## Environment Variables
//! - `KASA_DB_PATH`: SQLite file (default `./kasa.db`)
//! - `KASA_OPERATOR`: operator recorded when a form leaves `submittedBy` blank
//! - `KASA_RECENT_LIMIT`: default page size of `recent_orders` (default 20)
//! - `RUST_LOG`: tracing filter (default `info,kasa_core=debug,kasa_db=debug,kasa_counter=debug,sqlx=warn`)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use kasa_core::validation::validate_operator;

pub const DEFAULT_LOG_FILTER: &str = "info,kasa_core=debug,kasa_db=debug,kasa_counter=debug,sqlx=warn";

/// Counter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Fallback operator name
    pub default_operator: Option<String>,

    /// Default number of orders returned by `recent_orders`
    pub recent_limit: u32,

    /// tracing-subscriber filter directive
    pub log_filter: String,
}

impl Default for CounterConfig {
    fn default() -> Self {
        CounterConfig {
            database_path: PathBuf::from("./kasa.db"),
            default_operator: None,
            recent_limit: 20,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CounterConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = CounterConfig::default();

        let default_operator = match lookup("KASA_OPERATOR") {
            Some(raw) if !raw.trim().is_empty() => Some(
                validate_operator(&raw)
                    .map_err(|_| ConfigError::InvalidValue("KASA_OPERATOR".to_string()))?,
            ),
            _ => None,
        };

        let recent_limit = match lookup("KASA_RECENT_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("KASA_RECENT_LIMIT".to_string()))?,
            None => defaults.recent_limit,
        };

        Ok(CounterConfig {
            database_path: lookup("KASA_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            default_operator,
            recent_limit,
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
