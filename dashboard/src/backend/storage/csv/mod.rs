//! # CSV Storage
//!
//! File-based storage backend: one CSV file per collection plus a YAML
//! file for the local key-value store and one for the dashboard config,
//! all under one data directory.

pub mod config_repository;
pub mod connection;
pub mod key_value_repository;
pub mod record_repository;

#[cfg(test)]
pub mod test_utils;

pub use config_repository::{ConfigRepository, DashboardConfig};
pub use connection::CsvConnection;
pub use key_value_repository::YamlKeyValueRepository;
pub use record_repository::CsvRecordRepository;
