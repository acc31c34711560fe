//! # Domain Module
//!
//! Contains all business logic for the trip dashboard.
//!
//! Everything here works against the storage traits, so the same services
//! run over the in-memory stores in tests and the CSV/YAML stores in the
//! binary.
//!
//! ## Module Organization
//!
//! - **session_service**: persisted identity and the sign-in/sign-out broadcast
//! - **navigation**: which sidebar links a role sees
//! - **permissions**: which page actions a session may use
//! - **date_normalization**: the day-first to year-first date rewrite
//! - **record_service**: CRUD and date-range search per collection
//! - **list_controller**: loaded snapshot, paging and stale-response handling
//! - **form_controller**: create/edit drafts and validation
//! - **export_service**: CSV encoding and export files
//! - **page**: one trips or expenses page tying the above together
//!
//! ## Business Rules
//!
//! - An absent or unknown role is treated as `User`
//! - Date bounds are inclusive and compared as `YYYY-MM-DD` text
//! - Search results are paged client-side, 5 records per page by default
//! - Deletes need an explicit confirmation step
//! - Export covers the whole loaded set and refuses an empty one

pub mod date_normalization;
pub mod export_service;
pub mod form_controller;
pub mod list_controller;
pub mod navigation;
pub mod page;
pub mod permissions;
pub mod record_service;
pub mod session_service;

#[cfg(test)]
pub mod test_utils;

pub use date_normalization::{normalize_bound, normalize_date};
pub use export_service::{encode, ExportService};
pub use form_controller::{FormController, FormMode, FormSubmission};
pub use list_controller::{DeleteOutcome, ListController, ListState, PendingDelete, SearchOutcome, SearchTicket};
pub use navigation::{navigation_table, visible_entries, Sidebar};
pub use page::RecordPage;
pub use permissions::{Action, ActionPolicy};
pub use record_service::RecordService;
pub use session_service::{SessionEvent, SessionService, SessionSubscription, DEFAULT_SESSION_KEY};
