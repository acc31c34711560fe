//! # Local Storage Repository
//!
//! File-backed key-value store kept in a single YAML map,
//! `local_storage.yaml`, at the root of the data directory. It plays the
//! role browser local storage plays for the web client: the serialized
//! session lives here under one well-known key.
//!
//! ## YAML Format
//!
//! ```yaml
//! userData: '{"isLoggedIn":true,"name":"Amina","role":"Admin"}'
//! ```

use anyhow::{anyhow, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use super::connection::CsvConnection;
use crate::backend::storage::traits::KeyValueStore;

/// YAML-backed key-value store
pub struct YamlKeyValueRepository {
    file_path: PathBuf,
    lock: Mutex<()>,
}

impl YamlKeyValueRepository {
    pub fn new(connection: &CsvConnection) -> Self {
        Self {
            file_path: connection.local_storage_file_path(),
            lock: Mutex::new(()),
        }
    }

    /// Load every item; a missing file is an empty store
    fn load_items(&self) -> Result<BTreeMap<String, String>> {
        if !self.file_path.exists() {
            return Ok(BTreeMap::new());
        }
        let yaml_content = fs::read_to_string(&self.file_path)?;
        if yaml_content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_yaml::from_str(&yaml_content)?)
    }

    fn save_items(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let yaml_content = serde_yaml::to_string(items)?;

        // Use atomic write pattern: write to temp file, then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &self.file_path)?;

        debug!("Saved local storage to {:?}", self.file_path);
        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Local storage lock poisoned"))?;
        let mut items = self.load_items()?;
        change(&mut items);
        self.save_items(&items)
    }
}

impl KeyValueStore for YamlKeyValueRepository {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.modify(|items| {
            items.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;

    #[test]
    fn test_items_survive_reopen() {
        let env = TestEnvironment::new().unwrap();
        let store = YamlKeyValueRepository::new(&env.connection);
        store.set_item("userData", r#"{"isLoggedIn":true}"#).unwrap();
        store.set_item("theme", "dark").unwrap();

        let reopened = YamlKeyValueRepository::new(&env.connection);
        assert_eq!(
            reopened.get_item("userData").unwrap(),
            Some(r#"{"isLoggedIn":true}"#.to_string())
        );
        assert_eq!(reopened.get_item("theme").unwrap(), Some("dark".to_string()));
    }

    #[test]
    fn test_remove_item() {
        let env = TestEnvironment::new().unwrap();
        let store = YamlKeyValueRepository::new(&env.connection);
        store.set_item("userData", "{}").unwrap();
        store.remove_item("userData").unwrap();
        store.remove_item("userData").unwrap();
        assert_eq!(store.get_item("userData").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let env = TestEnvironment::new().unwrap();
        fs::write(env.base_path.join("local_storage.yaml"), "- not\n- a map\n").unwrap();
        let store = YamlKeyValueRepository::new(&env.connection);
        assert!(store.get_item("userData").is_err());
    }
}
