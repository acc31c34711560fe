//! # Storage Module
//!
//! Handles all data persistence operations for the dashboard.
//!
//! This module abstracts away the specific storage implementation details and provides
//! a consistent interface for persisting and retrieving data. The implementation can
//! be swapped out (remote document store, flat files, memory) without affecting the
//! domain logic.
//!
//! ## Key Responsibilities
//!
//! - **Record Persistence**: Storing trip and expense documents per collection
//! - **Range Queries**: Evaluating inclusive `>=` / `<=` predicates on a field
//! - **Local Storage**: Keeping the serialized session under a well-known key
//!
//! ## Current Implementations
//!
//! - **CSV**: One CSV file per collection, YAML file for local storage
//! - **Memory**: In-process maps for tests and throwaway sessions

pub mod csv;
pub mod memory;
pub mod traits;

// Re-export the main types that other modules need
pub use self::csv::{ConfigRepository, CsvConnection, CsvRecordRepository, DashboardConfig, YamlKeyValueRepository};
pub use memory::{MemoryKeyValueStore, MemoryRecordStorage};
pub use traits::{Comparison, KeyValueStore, QueryPredicate, RecordStorage};
