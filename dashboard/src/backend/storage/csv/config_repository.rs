//! # Dashboard Config Repository
//!
//! File-based configuration in a single YAML file `dashboard_config.yaml` at
//! the root of the data directory.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── dashboard_config.yaml   ← This module manages this file
//! ├── local_storage.yaml
//! ├── trips.csv
//! └── expenses.csv
//! ```
//!
//! ## YAML Format
//!
//! ```yaml
//! session_key: userData
//! page_size: 5
//! export_directory: null
//! created_at: "2025-01-21T19:30:00Z"
//! updated_at: "2025-01-21T19:35:00Z"
//! ```

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use shared::DEFAULT_PAGE_SIZE;
use std::fs;
use std::path::PathBuf;

use super::connection::CsvConnection;

const CONFIG_FILE: &str = "dashboard_config.yaml";

fn default_session_key() -> String {
    "userData".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Key the serialized session is stored under
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Records per list page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Where exports go when no path is given; documents folder when unset
    #[serde(default)]
    pub export_directory: Option<PathBuf>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            session_key: default_session_key(),
            page_size: default_page_size(),
            export_directory: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// YAML-backed config repository
#[derive(Clone)]
pub struct ConfigRepository {
    connection: CsvConnection,
}

impl ConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn config_path(&self) -> PathBuf {
        self.connection.base_directory().join(CONFIG_FILE)
    }

    /// Load the config, creating the default file if it doesn't exist
    pub fn load_or_create(&self) -> Result<DashboardConfig> {
        let config_path = self.config_path();

        if !config_path.exists() {
            let config = DashboardConfig::default();
            self.save(&config)?;
            info!("⚙️ Created default dashboard config at {:?}", config_path);
            return Ok(config);
        }

        let yaml_content = fs::read_to_string(&config_path)?;
        let mut config: DashboardConfig = serde_yaml::from_str(&yaml_content)
            .map_err(|e| anyhow!("Invalid dashboard config {:?}: {}", config_path, e))?;

        if config.page_size == 0 {
            warn!("⚠️ page_size 0 in {:?}, using 1", config_path);
            config.page_size = 1;
        }
        if config.session_key.trim().is_empty() {
            warn!("⚠️ Empty session_key in {:?}, using default", config_path);
            config.session_key = default_session_key();
        }

        debug!("Loaded dashboard config from {:?}", config_path);
        Ok(config)
    }

    /// Write the config, stamping `updated_at`
    pub fn save(&self, config: &DashboardConfig) -> Result<()> {
        let config_path = self.config_path();
        let mut config = config.clone();
        config.updated_at = Utc::now().to_rfc3339();
        if config.created_at.is_empty() {
            config.created_at = config.updated_at.clone();
        }

        let yaml_content = serde_yaml::to_string(&config)?;

        // Atomic write: temp file, then rename
        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved dashboard config to {:?}", config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let env = TestEnvironment::new().unwrap();
        let repo = ConfigRepository::new(env.connection.clone());

        let config = repo.load_or_create().unwrap();
        assert_eq!(config.session_key, "userData");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.export_directory, None);
        assert!(env.base_path.join("dashboard_config.yaml").exists());
    }

    #[test]
    fn test_saved_config_round_trips() {
        let env = TestEnvironment::new().unwrap();
        let repo = ConfigRepository::new(env.connection.clone());

        let mut config = repo.load_or_create().unwrap();
        config.page_size = 10;
        config.export_directory = Some(env.base_path.join("exports"));
        repo.save(&config).unwrap();

        let loaded = repo.load_or_create().unwrap();
        assert_eq!(loaded.page_size, 10);
        assert_eq!(loaded.export_directory, Some(env.base_path.join("exports")));
        assert_eq!(loaded.created_at, config.created_at);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let env = TestEnvironment::new().unwrap();
        fs::write(env.base_path.join(CONFIG_FILE), "page_size: 0\n").unwrap();

        let config = ConfigRepository::new(env.connection.clone()).load_or_create().unwrap();
        assert_eq!(config.page_size, 1);
        assert_eq!(config.session_key, "userData");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let env = TestEnvironment::new().unwrap();
        fs::write(env.base_path.join(CONFIG_FILE), "page_size: [lots\n").unwrap();
        assert!(ConfigRepository::new(env.connection.clone()).load_or_create().is_err());
    }
}
