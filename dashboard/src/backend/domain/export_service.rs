//! Export service domain logic for the dashboard.
//!
//! `encode` turns loaded records into CSV text and does no I/O.
//! `ExportService` wraps it into a downloadable payload and can write that
//! payload to a directory.

use csv::{Terminator, WriterBuilder};
use log::{error, info, warn};
use shared::{Column, EntityKind, ExportPayload, Record, CSV_MIME_TYPE};
use std::fs;
use std::path::PathBuf;

use crate::backend::error::DashboardError;

/// Encode records as CSV: one header row of labels, then one row per record
/// with the mapped fields in column order.
///
/// Missing fields become empty cells. Zero records is rejected with
/// `NoData`; callers should check before getting here.
pub fn encode(records: &[Record], columns: &[Column<'_>]) -> Result<String, DashboardError> {
    if records.is_empty() {
        return Err(DashboardError::NoData);
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|column| column.label))
        .map_err(|e| DashboardError::Export(e.to_string()))?;

    for record in records {
        writer
            .write_record(columns.iter().map(|column| record.text(column.key)))
            .map_err(|e| DashboardError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DashboardError::Export(e.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct ExportService {
    default_directory: Option<PathBuf>,
}

impl ExportService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export directory used when `export_to_path` gets no custom path
    pub fn with_default_directory(directory: Option<PathBuf>) -> Self {
        Self {
            default_directory: directory,
        }
    }

    /// Build the download for a set of loaded records
    pub fn export_records(&self, kind: EntityKind, records: &[Record]) -> Result<ExportPayload, DashboardError> {
        info!("📊 EXPORT: Exporting {} {}", records.len(), kind.collection());

        let content = encode(records, kind.columns()).map_err(|e| {
            warn!("⚠️ EXPORT: {} export refused: {}", kind.collection(), e);
            e
        })?;

        let payload = ExportPayload {
            filename: kind.export_filename().to_string(),
            mime_type: CSV_MIME_TYPE.to_string(),
            content,
            record_count: records.len(),
        };
        info!(
            "✅ EXPORT: Generated {} ({} bytes, {} records)",
            payload.filename,
            payload.content.len(),
            payload.record_count
        );
        Ok(payload)
    }

    /// Write a payload into `custom_path`, the configured export directory,
    /// or the user's documents folder, in that order. Returns the file path.
    pub fn export_to_path(
        &self,
        payload: &ExportPayload,
        custom_path: Option<&str>,
    ) -> Result<PathBuf, DashboardError> {
        info!("📁 EXPORT: Exporting to path - custom_path: {:?}", custom_path);

        let export_dir = match custom_path {
            Some(path) if !path.trim().is_empty() => PathBuf::from(sanitize_path(path)),
            _ => self.default_export_directory()?,
        };

        fs::create_dir_all(&export_dir).map_err(|e| {
            error!("❌ EXPORT: Failed to create export directory {:?}: {}", export_dir, e);
            DashboardError::Export(format!("Failed to create export directory: {}", e))
        })?;

        let file_path = export_dir.join(&payload.filename);
        fs::write(&file_path, &payload.content).map_err(|e| {
            error!("❌ EXPORT: Failed to write export file to {:?}: {}", file_path, e);
            DashboardError::Export(format!("Failed to write export file: {}", e))
        })?;

        info!(
            "✅ EXPORT: Exported {} records to: {}",
            payload.record_count,
            file_path.display()
        );
        Ok(file_path)
    }

    fn default_export_directory(&self) -> Result<PathBuf, DashboardError> {
        if let Some(directory) = &self.default_directory {
            return Ok(directory.clone());
        }
        dirs::document_dir().or_else(dirs::home_dir).ok_or_else(|| {
            error!("❌ EXPORT: Could not determine default export directory");
            DashboardError::Export("Failed to determine export directory".to_string())
        })
    }
}

/// Clean up a typed-in directory: quotes, escaped spaces, trailing
/// separators and a leading `~`
fn sanitize_path(path: &str) -> String {
    let mut cleaned = path.trim().to_string();

    if cleaned.len() >= 2
        && ((cleaned.starts_with('"') && cleaned.ends_with('"'))
            || (cleaned.starts_with('\'') && cleaned.ends_with('\'')))
    {
        cleaned = cleaned[1..cleaned.len() - 1].trim().to_string();
    }

    cleaned = cleaned.replace("\\ ", " ");

    while cleaned.len() > 1 && (cleaned.ends_with('/') || cleaned.ends_with('\\')) {
        cleaned.pop();
    }

    if cleaned.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            if cleaned == "~" {
                cleaned = home.to_string_lossy().to_string();
            } else if cleaned.starts_with("~/") || cleaned.starts_with("~\\") {
                cleaned = home.join(&cleaned[2..]).to_string_lossy().to_string();
            }
        }
    }

    cleaned
}
