//! TOML configuration
//!
//! ```toml
//! [detector]
//! unkeyed_rows = "positional"   # or "full_row"
//!
//! [logging]
//! profile = "development"       # development | production | test
//! ```
//!
//! Missing sections and keys take their defaults; unknown keys are errors.

use crate::errors::{DbSnapError, Result};
use crate::logging_facility::Profile;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// How rows are aligned when a snapshot has no usable primary key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnkeyedAlignment {
    /// Row i before against row i after
    #[default]
    Positional,
    /// Full-row values as a multiset; no modifications are reported
    FullRow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    pub unkeyed_rows: UnkeyedAlignment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbSnapConfig {
    pub detector: DetectorConfig,
    pub logging: LoggingConfig,
}

impl DbSnapConfig {
    /// # Errors
    ///
    /// `Config` for invalid TOML, unknown keys or unknown enum values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DbSnapError::Config {
            reason: format!("TOML parse error: {}", e),
        })
    }

    /// # Errors
    ///
    /// `Io` when the file cannot be read, `Config` when it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DbSnapError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = DbSnapConfig::from_toml_str("").unwrap();
        assert_eq!(config, DbSnapConfig::default());
        assert_eq!(config.detector.unkeyed_rows, UnkeyedAlignment::Positional);
        assert_eq!(config.logging.profile, Profile::Development);
    }

    #[test]
    fn test_full_document() {
        let config = DbSnapConfig::from_toml_str(
            "[detector]\nunkeyed_rows = \"full_row\"\n\n[logging]\nprofile = \"production\"\n",
        )
        .unwrap();
        assert_eq!(config.detector.unkeyed_rows, UnkeyedAlignment::FullRow);
        assert_eq!(config.logging.profile, Profile::Production);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = DbSnapConfig::from_toml_str("[detector]\nalign = \"positional\"\n").unwrap_err();
        assert!(matches!(err, DbSnapError::Config { .. }));
        assert!(DbSnapConfig::from_toml_str("[detector]\nunkeyed_rows = \"fuzzy\"\n").is_err());
    }
}
