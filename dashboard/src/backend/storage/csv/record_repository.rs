//! # CSV Record Repository
//!
//! File-backed document store: every collection lives in its own CSV file
//! in the data directory.
//!
//! ```text
//! data/
//! ├── dashboard_config.yaml
//! ├── local_storage.yaml
//! ├── trips.csv        ← managed here
//! └── expenses.csv     ← managed here
//! ```
//!
//! The first column is always `id`; the remaining columns are the sorted
//! union of every field name in the collection. Empty cells mean the field
//! is absent, and every value reads back as text: numbers and booleans come
//! back in their display form, and blank text is dropped. Range predicates
//! therefore see a stored number as text once it has been through a file.
//! Each write rewrites the whole file through a temp file and a rename.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use csv::{Reader, Writer};
use log::{debug, info, warn};
use shared::{FieldValue, Fields, Record};
use std::collections::BTreeSet;
use std::fs;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::connection::CsvConnection;
use crate::backend::storage::traits::{QueryPredicate, RecordStorage};

const ID_COLUMN: &str = "id";

/// CSV-based record repository
#[derive(Clone)]
pub struct CsvRecordRepository {
    connection: CsvConnection,
    write_lock: Arc<Mutex<()>>,
}

impl CsvRecordRepository {
    /// Create a new CSV record repository
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read all records of a collection; a missing file is an empty collection
    fn read_records(&self, collection: &str) -> Result<Vec<Record>> {
        let file_path = self.connection.collection_file_path(collection)?;
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let mut csv_reader = Reader::from_path(&file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        let headers = csv_reader.headers()?.clone();
        if headers.get(0) != Some(ID_COLUMN) {
            return Err(anyhow!(
                "{} does not start with an '{}' column",
                file_path.display(),
                ID_COLUMN
            ));
        }

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let id = row.get(0).unwrap_or("").to_string();
            if id.is_empty() {
                warn!("Skipping row without id in {}", file_path.display());
                continue;
            }

            let fields: Fields = headers
                .iter()
                .zip(row.iter())
                .skip(1)
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, value)| (name.to_string(), FieldValue::from(value)))
                .collect();
            records.push(Record::new(id, fields));
        }

        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    /// Write all records of a collection
    fn write_records(&self, collection: &str, records: &[Record]) -> Result<()> {
        let file_path = self.connection.collection_file_path(collection)?;

        let columns: BTreeSet<&str> = records
            .iter()
            .flat_map(|record| record.fields.keys().map(String::as_str))
            .filter(|name| *name != ID_COLUMN)
            .collect();

        // Use atomic write pattern: write to temp file, then rename
        let temp_path = file_path.with_extension("csv.tmp");
        {
            let mut csv_writer = Writer::from_path(&temp_path)?;

            let mut header = vec![ID_COLUMN];
            header.extend(columns.iter().copied());
            csv_writer.write_record(&header)?;

            for record in records {
                let mut row = vec![record.id.clone()];
                row.extend(columns.iter().map(|column| record.text(column)));
                csv_writer.write_record(&row)?;
            }
            csv_writer.flush()?;
        }
        fs::rename(&temp_path, &file_path)?;

        debug!("Wrote {} records to {}", records.len(), file_path.display());
        Ok(())
    }

    fn with_write_lock<T>(&self, action: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("CSV record repository lock poisoned"))?;
        action()
    }
}

#[async_trait]
impl RecordStorage for CsvRecordRepository {
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>> {
        self.read_records(collection)
    }

    async fn query_records(&self, collection: &str, predicates: &[QueryPredicate]) -> Result<Vec<Record>> {
        let records = self.read_records(collection)?;
        Ok(records
            .into_iter()
            .filter(|record| predicates.iter().all(|predicate| predicate.matches(&record.fields)))
            .collect())
    }

    async fn insert_record(&self, collection: &str, fields: &Fields) -> Result<String> {
        self.with_write_lock(|| {
            let mut records = self.read_records(collection)?;
            let id = Uuid::new_v4().simple().to_string();
            records.push(Record::new(id.clone(), fields.clone()));
            records.sort_by(|a, b| a.id.cmp(&b.id));
            self.write_records(collection, &records)?;
            info!("💾 Stored {} record {}", collection, id);
            Ok(id)
        })
    }

    async fn update_record(&self, collection: &str, id: &str, fields: &Fields) -> Result<bool> {
        self.with_write_lock(|| {
            let mut records = self.read_records(collection)?;
            let Some(existing) = records.iter_mut().find(|record| record.id == id) else {
                return Ok(false);
            };
            existing
                .fields
                .extend(fields.iter().map(|(key, value)| (key.clone(), value.clone())));
            self.write_records(collection, &records)?;
            info!("💾 Updated {} record {}", collection, id);
            Ok(true)
        })
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<bool> {
        self.with_write_lock(|| {
            let mut records = self.read_records(collection)?;
            let before = records.len();
            records.retain(|record| record.id != id);
            if records.len() == before {
                return Ok(false);
            }
            self.write_records(collection, &records)?;
            info!("🗑️ Deleted {} record {}", collection, id);
            Ok(true)
        })
    }
}
