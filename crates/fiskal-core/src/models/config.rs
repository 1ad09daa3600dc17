//! Configuration for journal parsing and URL decoding.

use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{FiskalError, Result};

/// Main configuration for the fiskal library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiskalConfig {
    /// Journal parsing configuration.
    pub journal: JournalConfig,

    /// Verification URL configuration.
    pub url: UrlConfig,
}

/// Journal parsing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// IANA timezone the fiscalization time is printed in.
    pub timezone: String,

    /// Unit used for items that print none.
    pub default_unit: String,

    /// Use the current time when the fiscalization time is unreadable.
    pub fallback_to_now: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Belgrade".to_string(),
            default_unit: "KOM".to_string(),
            fallback_to_now: true,
        }
    }
}

impl JournalConfig {
    /// Resolve the configured timezone.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| FiskalError::Config(format!("unknown timezone: {}", self.timezone)))
    }
}

/// Verification URL configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlConfig {
    /// Only URLs on this host are decoded.
    pub allowed_host: String,

    /// Reject payloads whose trailing checksum does not match.
    pub verify_hash: bool,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            allowed_host: "suf.purs.gov.rs".to_string(),
            verify_hash: true,
        }
    }
}

impl FiskalConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| FiskalError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FiskalError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FiskalConfig::default();
        assert_eq!(config.journal.timezone().unwrap(), chrono_tz::Europe::Belgrade);
        assert_eq!(config.journal.default_unit, "KOM");
        assert_eq!(config.url.allowed_host, "suf.purs.gov.rs");
        assert!(config.url.verify_hash);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: FiskalConfig =
            serde_json::from_str(r#"{"url": {"verify_hash": false}}"#).unwrap();
        assert!(!config.url.verify_hash);
        assert_eq!(config.url.allowed_host, "suf.purs.gov.rs");
        assert!(config.journal.fallback_to_now);
    }

    #[test]
    fn test_unknown_timezone() {
        let config = JournalConfig {
            timezone: "Mars/Olympus".to_string(),
            ..JournalConfig::default()
        };
        assert!(matches!(config.timezone(), Err(FiskalError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = FiskalConfig::default();
        config.journal.default_unit = "KG".to_string();
        config.save(&path).unwrap();

        assert_eq!(FiskalConfig::from_file(&path).unwrap(), config);
    }
}
