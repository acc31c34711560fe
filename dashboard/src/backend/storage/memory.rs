//! In-process implementations of the storage traits.
//!
//! Used by the tests and by anything that wants a throwaway dashboard
//! without touching the file system.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use shared::{Fields, Record};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::traits::{KeyValueStore, QueryPredicate, RecordStorage};

type Collections = HashMap<String, BTreeMap<String, Fields>>;

/// Document store held entirely in memory
#[derive(Clone, Default)]
pub struct MemoryRecordStorage {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryRecordStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>> {
        self.collections
            .lock()
            .map_err(|_| anyhow!("In-memory record store lock poisoned"))
    }

    /// Number of documents currently stored in a collection
    pub fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.lock()?.get(collection).map_or(0, BTreeMap::len))
    }
}

#[async_trait]
impl RecordStorage for MemoryRecordStorage {
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>> {
        self.query_records(collection, &[]).await
    }

    async fn query_records(&self, collection: &str, predicates: &[QueryPredicate]) -> Result<Vec<Record>> {
        let collections = self.lock()?;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .iter()
            .filter(|(_, fields)| predicates.iter().all(|predicate| predicate.matches(fields)))
            .map(|(id, fields)| Record::new(id.clone(), fields.clone()))
            .collect())
    }

    async fn insert_record(&self, collection: &str, fields: &Fields) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());
        debug!("Inserted {} into in-memory collection '{}'", id, collection);
        Ok(id)
    }

    async fn update_record(&self, collection: &str, id: &str, fields: &Fields) -> Result<bool> {
        let mut collections = self.lock()?;
        match collections.get_mut(collection).and_then(|documents| documents.get_mut(id)) {
            Some(existing) => {
                existing.extend(fields.iter().map(|(key, value)| (key.clone(), value.clone())));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self
            .lock()?
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .is_some())
    }
}

/// Key-value store held in memory, the stand-in for browser local storage
#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| anyhow!("In-memory key-value store lock poisoned"))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
