//! Admin CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use repairdesk_db::DbConfig;
use serde::{Deserialize, Serialize};

/// Admin CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a statement waits on a locked database
    pub busy_timeout_ms: u64,

    /// Check CarDetails/ComputerDetails against the parent's RepairType
    pub enforce_subtype_match: bool,

    /// Upper bound on one validated write (unset: no bound)
    pub write_timeout_ms: Option<u64>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let parsed = |key: &str, default: &str| {
            lookup(key)
                .unwrap_or_else(|| default.to_string())
                .trim()
                .to_string()
        };

        Ok(AppConfig {
            database_path: PathBuf::from(parsed("REPAIRDESK_DB_PATH", "repairdesk.db")),

            max_connections: parsed("REPAIRDESK_MAX_CONNECTIONS", "5")
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("REPAIRDESK_MAX_CONNECTIONS".to_string()))?,

            busy_timeout_ms: parsed("REPAIRDESK_BUSY_TIMEOUT_MS", "5000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("REPAIRDESK_BUSY_TIMEOUT_MS".to_string()))?,

            enforce_subtype_match: parse_bool(&parsed("REPAIRDESK_ENFORCE_SUBTYPE_MATCH", "true"))
                .ok_or_else(|| {
                    ConfigError::InvalidValue("REPAIRDESK_ENFORCE_SUBTYPE_MATCH".to_string())
                })?,

            write_timeout_ms: match lookup("REPAIRDESK_WRITE_TIMEOUT_MS") {
                Some(raw) => Some(raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("REPAIRDESK_WRITE_TIMEOUT_MS".to_string())
                })?),
                None => None,
            },
        })
    }

    /// Database configuration for this run.
    pub fn db_config(&self) -> DbConfig {
        let config = DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
            .enforce_subtype_match(self.enforce_subtype_match);

        match self.write_timeout_ms {
            Some(ms) => config.write_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("repairdesk.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.enforce_subtype_match);
        assert_eq!(config.write_timeout_ms, None);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("REPAIRDESK_DB_PATH", "/tmp/shop.db"),
            ("REPAIRDESK_MAX_CONNECTIONS", "2"),
            ("REPAIRDESK_ENFORCE_SUBTYPE_MATCH", "off"),
            ("REPAIRDESK_WRITE_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.max_connections, 2);
        assert!(!config.enforce_subtype_match);

        let db = config.db_config();
        assert_eq!(db.max_connections, 2);
        assert!(!db.enforce_subtype_match);
        assert_eq!(db.write_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("REPAIRDESK_MAX_CONNECTIONS", "many")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for REPAIRDESK_MAX_CONNECTIONS");

        assert!(load(&[("REPAIRDESK_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("REPAIRDESK_ENFORCE_SUBTYPE_MATCH", "maybe")]).is_err());
        assert!(load(&[("REPAIRDESK_BUSY_TIMEOUT_MS", "-1")]).is_err());
    }
}
