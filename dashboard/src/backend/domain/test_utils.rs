//! Shared fixtures for the domain service tests
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{FieldValue, Fields, Record};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::storage::{MemoryRecordStorage, QueryPredicate, RecordStorage};

/// A trip draft with every required field filled in
pub fn trip_fields(trip_date: &str, driver: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("tripDate".to_string(), FieldValue::from(trip_date));
    fields.insert("truckPlateNumber".to_string(), FieldValue::from("KBX 123A"));
    fields.insert("truckDriverName".to_string(), FieldValue::from(driver));
    fields.insert("customerName".to_string(), FieldValue::from("Acme Cement"));
    fields
}

pub fn expense_fields(title: &str, amount: f64, date: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("title".to_string(), FieldValue::from(title));
    fields.insert("amount".to_string(), FieldValue::from(amount));
    fields.insert("date".to_string(), FieldValue::from(date));
    fields
}

/// Memory-backed storage that can be switched into failing every call
pub struct FailingStorage {
    inner: MemoryRecordStorage,
    message: String,
    failing: AtomicBool,
}

impl FailingStorage {
    /// Fails from the first call
    pub fn new(message: &str) -> Self {
        let storage = Self::healthy(message);
        storage.set_failing(true);
        storage
    }

    /// Works until `set_failing(true)`
    pub fn healthy(message: &str) -> Self {
        Self {
            inner: MemoryRecordStorage::new(),
            message: message.to_string(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(anyhow!("{}", self.message))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStorage for FailingStorage {
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>> {
        self.check()?;
        self.inner.list_records(collection).await
    }

    async fn query_records(&self, collection: &str, predicates: &[QueryPredicate]) -> Result<Vec<Record>> {
        self.check()?;
        self.inner.query_records(collection, predicates).await
    }

    async fn insert_record(&self, collection: &str, fields: &Fields) -> Result<String> {
        self.check()?;
        self.inner.insert_record(collection, fields).await
    }

    async fn update_record(&self, collection: &str, id: &str, fields: &Fields) -> Result<bool> {
        self.check()?;
        self.inner.update_record(collection, id, fields).await
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<bool> {
        self.check()?;
        self.inner.delete_record(collection, id).await
    }
}
