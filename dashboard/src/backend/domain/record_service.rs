//! Record service domain logic for the dashboard.
//!
//! CRUD facade over one collection per `EntityKind`. Turns search criteria
//! into range predicates on the kind's date field, keeps ids out of field
//! maps and maps storage failures onto `DashboardError`.
use anyhow::Context;
use log::{error, info, warn};
use shared::{EntityKind, Fields, Record, SearchCriteria};
use std::sync::Arc;

use crate::backend::domain::date_normalization::normalize_bound;
use crate::backend::error::DashboardError;
use crate::backend::storage::{QueryPredicate, RecordStorage};

pub struct RecordService<S: RecordStorage> {
    storage: Arc<S>,
}

impl<S: RecordStorage> Clone for RecordService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: RecordStorage> RecordService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Every record of a kind, unfiltered
    pub async fn list(&self, kind: EntityKind) -> Result<Vec<Record>, DashboardError> {
        let collection = kind.collection();
        self.storage
            .list_records(collection)
            .await
            .with_context(|| format!("Error fetching {}", collection))
            .map_err(|e| {
                error!("❌ LIST: {:#}", e);
                DashboardError::repository(e)
            })
    }

    /// Records whose date field falls inside the (inclusive) criteria range.
    ///
    /// With neither bound present this is the same as `list`.
    pub async fn list_filtered(
        &self,
        kind: EntityKind,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Record>, DashboardError> {
        let predicates = Self::build_predicates(kind, criteria);
        if predicates.is_empty() {
            return self.list(kind).await;
        }

        let collection = kind.collection();
        info!(
            "🔍 SEARCH: {} where {}",
            collection,
            predicates
                .iter()
                .map(|p| format!("{} {} '{}'", p.field, p.comparison.symbol(), p.value))
                .collect::<Vec<_>>()
                .join(" and ")
        );

        self.storage
            .query_records(collection, &predicates)
            .await
            .with_context(|| format!("Error fetching {}", collection))
            .map_err(|e| {
                error!("❌ SEARCH: {:#}", e);
                DashboardError::repository(e)
            })
    }

    /// Range predicates for the criteria: one per present, non-empty bound
    pub fn build_predicates(kind: EntityKind, criteria: &SearchCriteria) -> Vec<QueryPredicate> {
        let field = kind.date_field();
        let mut predicates = Vec::new();
        if let Some(from) = normalize_bound(criteria.from_date.as_deref()) {
            predicates.push(QueryPredicate::at_least(field, from));
        }
        if let Some(to) = normalize_bound(criteria.to_date.as_deref()) {
            predicates.push(QueryPredicate::at_most(field, to));
        }
        predicates
    }

    /// Insert a record and return its generated id
    pub async fn add(&self, kind: EntityKind, fields: Fields) -> Result<String, DashboardError> {
        let collection = kind.collection();
        let fields = without_id(fields);
        let id = self
            .storage
            .insert_record(collection, &fields)
            .await
            .with_context(|| format!("Error saving {}", kind.display_name().to_lowercase()))
            .map_err(|e| {
                error!("❌ ADD: {:#}", e);
                DashboardError::repository(e)
            })?;
        info!("✅ ADD: {} record {} created", collection, id);
        Ok(id)
    }

    /// Merge fields into an existing record
    pub async fn update(&self, kind: EntityKind, id: &str, fields: Fields) -> Result<(), DashboardError> {
        let collection = kind.collection();
        let fields = without_id(fields);
        let found = self
            .storage
            .update_record(collection, id, &fields)
            .await
            .with_context(|| format!("Error saving {}", kind.display_name().to_lowercase()))
            .map_err(|e| {
                error!("❌ UPDATE: {:#}", e);
                DashboardError::repository(e)
            })?;

        if !found {
            warn!("⚠️ UPDATE: {} record {} no longer exists", collection, id);
            return Err(DashboardError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        info!("✅ UPDATE: {} record {} updated", collection, id);
        Ok(())
    }

    /// Delete a record.
    ///
    /// Returns false when the record was already gone; that is not an
    /// error. Callers confirm intent before getting here.
    pub async fn remove(&self, kind: EntityKind, id: &str) -> Result<bool, DashboardError> {
        let collection = kind.collection();
        let removed = self
            .storage
            .delete_record(collection, id)
            .await
            .with_context(|| format!("Error deleting {}", kind.display_name().to_lowercase()))
            .map_err(|e| {
                error!("❌ DELETE: {:#}", e);
                DashboardError::repository(e)
            })?;

        if removed {
            info!("🗑️ DELETE: {} record {} deleted", collection, id);
        } else {
            warn!("⚠️ DELETE: {} record {} was already removed", collection, id);
        }
        Ok(removed)
    }
}

/// Ids live beside the fields, never inside them
fn without_id(mut fields: Fields) -> Fields {
    fields.remove("id");
    fields
}
