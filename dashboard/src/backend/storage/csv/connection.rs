use anyhow::{anyhow, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// File holding the local key-value store (the persisted session)
const LOCAL_STORAGE_FILE: &str = "local_storage.yaml";

/// CsvConnection manages the data directory and the file paths of each
/// collection stored in it
#[derive(Clone, Debug)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("📁 Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Get the CSV file backing a collection.
    ///
    /// Collection names become file names, so only ASCII letters, digits,
    /// `_` and `-` are accepted.
    pub fn collection_file_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(anyhow!("Invalid collection name '{}'", collection));
        }
        Ok(self.base_directory.join(format!("{}.csv", collection)))
    }

    /// Get the file path of the local key-value store
    pub fn local_storage_file_path(&self) -> PathBuf {
        self.base_directory.join(LOCAL_STORAGE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let connection = CsvConnection::new(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(connection.base_directory(), nested.as_path());
    }

    #[test]
    fn test_collection_file_path_validates_names() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();

        let path = connection.collection_file_path("trips").unwrap();
        assert_eq!(path, temp_dir.path().join("trips.csv"));
        assert!(connection.collection_file_path("../etc").is_err());
        assert!(connection.collection_file_path("").is_err());
    }
}
