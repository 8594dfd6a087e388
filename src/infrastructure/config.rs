//! Aggregate configuration for the three utilities.
//!
//! Every section has defaults, so an empty document yields the stock setup:
//!
//! ```
//! use client_governance::GovernanceConfig;
//!
//! let config = GovernanceConfig::from_json_str("{}").unwrap();
//! assert_eq!(config.consent.storage_key, "cookie-consent");
//! assert_eq!(config.worker.cache_name(), "autoflow-v1");
//! ```

use crate::application::consent::ConsentConfig;
use crate::application::worker::{WorkerConfig, WorkerConfigError};
use crate::domain::window::WindowConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Rate limiter section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Windows keyed by operation name (`checkout`, `auth`, `api`, or custom)
    pub operations: BTreeMap<String, WindowConfig>,
    /// Fallback for operations without an entry
    pub default_window: Option<WindowConfig>,
}

/// Configuration for all governance utilities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    pub limits: LimitsConfig,
    pub consent: ConsentConfig,
    pub worker: WorkerConfig,
}

/// Error returned when configuration cannot be loaded.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io(std::io::Error),
    /// The document is not valid JSON for this schema
    Parse(serde_json::Error),
    /// The worker section is inconsistent
    Worker(WorkerConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::Worker(e) => write!(f, "invalid worker config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Worker(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<WorkerConfigError> for ConfigError {
    fn from(e: WorkerConfigError) -> Self {
        ConfigError::Worker(e)
    }
}

impl GovernanceConfig {
    /// Parse and validate a JSON document.
    ///
    /// Rate-limit windows are validated when the limiter is built, so that
    /// the error names the offending operation.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.worker.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_full_document() {
        let json = r#"{
            "limits": {
                "operations": {
                    "checkout": { "max_attempts": 2, "window_ms": 30000 }
                },
                "default_window": { "max_attempts": 20, "window_ms": 60000 }
            },
            "consent": { "storage_key": "consent-v2", "version": "2.0" },
            "worker": {
                "cache_prefix": "site",
                "version": "v7",
                "precache": ["/", "/offline.html"],
                "offline_page": "/offline.html",
                "network_timeout_ms": 3000
            }
        }"#;

        let config = GovernanceConfig::from_json_str(json).unwrap();
        assert_eq!(
            config.limits.operations["checkout"],
            WindowConfig::new(2, Duration::from_secs(30)).unwrap()
        );
        assert_eq!(config.limits.default_window.unwrap().max_attempts(), 20);
        assert_eq!(config.consent.version, "2.0");
        assert_eq!(config.worker.cache_name(), "site-v7");
        assert_eq!(config.worker.network_timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_defaults() {
        let config = GovernanceConfig::from_json_str("{}").unwrap();
        assert!(config.limits.operations.is_empty());
        assert_eq!(config.limits.default_window, None);
        assert_eq!(config.consent.version, "1.0");
        assert_eq!(config.worker.network_timeout(), None);
    }

    #[test]
    fn test_invalid_worker_section() {
        let json = r#"{"worker": {"version": ""}}"#;
        let err = GovernanceConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Worker(WorkerConfigError::EmptyVersion)));
    }

    #[test]
    fn test_parse_error() {
        let err = GovernanceConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("governance.json");
        std::fs::write(&path, r#"{"consent":{"version":"3"}}"#).unwrap();

        let config = GovernanceConfig::from_path(&path).unwrap();
        assert_eq!(config.consent.version, "3");
        assert_eq!(config.consent.storage_key, "cookie-consent");

        let missing = GovernanceConfig::from_path(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
