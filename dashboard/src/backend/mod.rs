//! # Backend Module
//!
//! Contains all non-UI logic for the trip dashboard.
//!
//! ## Architecture
//!
//! ```text
//! UI / CLI
//!     ↓
//! Domain Layer (session, navigation, list/form controllers, export)
//!     ↓
//! Storage Layer (CSV + YAML files, or in-memory)
//! ```
//!
//! `DashboardContext` wires the file-backed stores to the domain services
//! for one data directory.

use anyhow::{Context, Result};
use log::info;
use shared::EntityKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod domain;
pub mod error;
pub mod storage;

pub use domain::*;
pub use error::DashboardError;
pub use storage::{
    ConfigRepository, CsvConnection, CsvRecordRepository, DashboardConfig, YamlKeyValueRepository,
};

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "TRIP_DASHBOARD_DATA_DIR";

/// `$TRIP_DASHBOARD_DATA_DIR`, else `~/Documents/Trip Dashboard`, else a
/// directory under the system temp dir
pub fn default_data_directory() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join("Trip Dashboard"))
        .unwrap_or_else(|| std::env::temp_dir().join("trip_dashboard"))
}

pub type FileRecordPage = RecordPage<CsvRecordRepository, YamlKeyValueRepository>;

/// All services for one data directory
pub struct DashboardContext {
    pub config: DashboardConfig,
    pub data_directory: PathBuf,
    pub session_service: SessionService<YamlKeyValueRepository>,
    pub record_service: RecordService<CsvRecordRepository>,
    pub export_service: ExportService,
}

impl DashboardContext {
    /// A page for `kind` sharing this context's services
    pub fn page(&self, kind: EntityKind) -> FileRecordPage {
        RecordPage::new(
            kind,
            &self.session_service,
            self.record_service.clone(),
            self.export_service.clone(),
            self.config.page_size,
        )
    }
}

/// Open (creating if needed) the data directory and build every service
pub fn initialize_backend(data_directory: &Path) -> Result<DashboardContext> {
    let connection = CsvConnection::new(data_directory)
        .with_context(|| format!("Failed to open data directory {}", data_directory.display()))?;

    let config = ConfigRepository::new(connection.clone())
        .load_or_create()
        .context("Failed to load dashboard config")?;

    let session_store = Arc::new(YamlKeyValueRepository::new(&connection));
    let session_service = SessionService::new(session_store, config.session_key.clone());
    let record_service = RecordService::new(Arc::new(CsvRecordRepository::new(connection)));
    let export_service = ExportService::with_default_directory(config.export_directory.clone());

    info!("🚀 Backend initialized at {}", data_directory.display());
    Ok(DashboardContext {
        config,
        data_directory: data_directory.to_path_buf(),
        session_service,
        record_service,
        export_service,
    })
}
