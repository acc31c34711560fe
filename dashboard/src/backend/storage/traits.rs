//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.
//!
//! The record store is treated as an opaque remote document database: it
//! knows collection names, simple range predicates and the four CRUD verbs,
//! and nothing about trips or expenses.

use anyhow::Result;
use async_trait::async_trait;
use shared::{FieldValue, Fields, Record};

/// Comparison operator of a range predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `>=`
    AtLeast,
    /// `<=`
    AtMost,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::AtLeast => ">=",
            Comparison::AtMost => "<=",
        }
    }
}

/// Inclusive bound on a single field.
///
/// Values compare as strings, the way the document store orders text
/// fields. A document without the field, or whose field is not text, never
/// matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPredicate {
    pub field: String,
    pub comparison: Comparison,
    pub value: String,
}

impl QueryPredicate {
    pub fn at_least(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            comparison: Comparison::AtLeast,
            value: value.into(),
        }
    }

    pub fn at_most(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            comparison: Comparison::AtMost,
            value: value.into(),
        }
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        let Some(FieldValue::Text(actual)) = fields.get(&self.field) else {
            return false;
        };
        match self.comparison {
            Comparison::AtLeast => actual.as_str() >= self.value.as_str(),
            Comparison::AtMost => actual.as_str() <= self.value.as_str(),
        }
    }
}

/// Trait defining the interface for document storage operations
///
/// Implementations return records ordered by id, matching the default
/// ordering of the remote store.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Fetch every document in a collection
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>>;

    /// Fetch the documents matching all predicates
    async fn query_records(&self, collection: &str, predicates: &[QueryPredicate]) -> Result<Vec<Record>>;

    /// Insert a new document and return its generated id
    async fn insert_record(&self, collection: &str, fields: &Fields) -> Result<String>;

    /// Merge `fields` into an existing document
    /// Returns false when no document with `id` exists
    async fn update_record(&self, collection: &str, id: &str, fields: &Fields) -> Result<bool>;

    /// Delete a document
    /// Returns true if the document was found and deleted, false otherwise
    async fn delete_record(&self, collection: &str, id: &str) -> Result<bool>;
}

/// Trait defining the interface for the local key-value store that keeps
/// the persisted session
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}
