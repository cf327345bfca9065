// src/storage/mod.rs
pub mod render;

use std::fs;
use std::path::{Path, PathBuf};

use crate::extractors::DocumentReport;
use crate::utils::error::StorageError;

pub use render::{render_json, render_text};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves the delimited rendering of all records as `<stem>_records.txt`
    pub fn save_records(&self, stem: &str, report: &DocumentReport) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_records.txt", stem));
        fs::write(&file_path, render_text(&report.records())).map_err(StorageError::IoError)?;

        tracing::info!("Saved records to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the per-table JSON rendering as `<stem>_records.json`
    pub fn save_records_json(&self, stem: &str, report: &DocumentReport) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_records.json", stem));
        fs::write(&file_path, render_json(report)?).map_err(StorageError::IoError)?;

        tracing::info!("Saved JSON records to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves extraction counts in JSON format as `<stem>_meta.json`
    pub fn save_metadata(&self, stem: &str, report: &DocumentReport) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        let metadata = serde_json::json!({
            "source": stem,
            "tables": report.tables.len(),
            "extracted_tables": report.extracted().count(),
            "skipped_tables": report.skipped_count(),
            "failed_tables": report.failed_count(),
            "records": report.record_count(),
            "failed_rows": report.row_failure_count(),
            "ignored_markers": report.ignored_markers,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}
