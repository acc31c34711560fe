//! Error types surfaced by the dashboard domain layer.
//!
//! Nothing here is fatal: every variant is meant to end up as a
//! notification while the prior list and form state stay intact.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// Required form fields are blank; blocks submission
    #[error("Please fill out all fields (missing: {})", .missing.join(", "))]
    Validation { missing: Vec<String> },

    /// Backend failure on list/add/update/delete
    #[error("{0}")]
    Repository(String),

    /// Update or delete of a record that no longer exists upstream
    #[error("{collection} record '{id}' no longer exists")]
    NotFound { collection: String, id: String },

    /// Export requested with nothing loaded
    #[error("No data to export")]
    NoData,

    /// Action hidden from the current role or signed-out session
    #[error("{action} is not available to {who}")]
    Forbidden { action: String, who: String },

    /// Submit called while no form is open
    #[error("No form is open")]
    FormNotOpen,

    #[error("Failed to encode export: {0}")]
    Export(String),

    #[error("Failed to persist session: {0}")]
    Session(String),
}

impl DashboardError {
    /// Wrap a storage failure, keeping the whole context chain in the message
    pub fn repository(error: anyhow::Error) -> Self {
        DashboardError::Repository(format!("{:#}", error))
    }

    /// Whether the loaded list is known to be out of date
    pub fn should_refresh(&self) -> bool {
        matches!(self, DashboardError::NotFound { .. })
    }
}
