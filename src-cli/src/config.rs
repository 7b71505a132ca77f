//! Locker configuration
//!
//! Configuration is read once at startup from a JSON file. A missing file
//! means defaults; so does a file that cannot be parsed, with a warning.

use crate::error::Result;
use lock_engine::LockOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "template-locker.json";

/// Settings for lock requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LockerConfig {
    /// Root under which each request gets its own scratch directory
    pub scratch_dir: PathBuf,
    /// Prepended to the file name of a locked document
    pub output_prefix: String,
    /// First form field identifier handed out in a word document
    pub region_id_base: u32,
    /// Largest number of cells a spreadsheet may span
    pub max_cells: u64,
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("temp"),
            output_prefix: "protected_".to_string(),
            region_id_base: LockOptions::default().region_id_base,
            max_cells: LockOptions::default().max_cells,
        }
    }
}

impl LockerConfig {
    /// Engine options for one request
    pub fn lock_options(&self) -> LockOptions {
        LockOptions {
            region_id_base: self.region_id_base,
            max_cells: self.max_cells,
        }
    }
}

/// Loads the configuration file
pub struct ConfigManager {
    /// Path to the configuration file
    config_path: PathBuf,
    /// Current configuration (cached)
    current: LockerConfig,
}

impl ConfigManager {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            current: LockerConfig::default(),
        }
    }

    /// Get the path to the configuration file
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, or defaults if the file doesn't exist
    pub fn load_sync(&mut self) -> Result<&LockerConfig> {
        if self.config_path.exists() {
            let content = std::fs::read_to_string(&self.config_path)?;
            match serde_json::from_str::<LockerConfig>(&content) {
                Ok(config) => {
                    self.current = config;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse config file {}, using defaults: {}",
                        self.config_path.display(),
                        e
                    );
                    self.current = LockerConfig::default();
                }
            }
        } else {
            tracing::debug!("No config file at {}, using defaults", self.config_path.display());
            self.current = LockerConfig::default();
        }
        Ok(&self.current)
    }

    /// Get current configuration
    pub fn get(&self) -> &LockerConfig {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LockerConfig::default();
        assert_eq!(config.scratch_dir, PathBuf::from("temp"));
        assert_eq!(config.output_prefix, "protected_");
        assert_eq!(config.region_id_base, 1_000_000);
        assert_eq!(config.lock_options(), LockOptions::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new(temp_dir.path().join("missing.json"));
        assert_eq!(manager.load_sync().unwrap(), &LockerConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"output_prefix": "locked-", "region_id_base": 7, "max_cells": 500}"#,
        )
        .unwrap();

        let mut manager = ConfigManager::new(&path);
        let config = manager.load_sync().unwrap();
        assert_eq!(config.output_prefix, "locked-");
        assert_eq!(config.region_id_base, 7);
        assert_eq!(config.scratch_dir, PathBuf::from("temp"));
        assert_eq!(manager.get().lock_options().region_id_base, 7);
        assert_eq!(manager.get().lock_options().max_cells, 500);
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut manager = ConfigManager::new(&path);
        assert_eq!(manager.config_path(), path.as_path());
        assert_eq!(manager.load_sync().unwrap(), &LockerConfig::default());
    }
}
