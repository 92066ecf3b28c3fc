//! # Reporter Module
//!
//! Everything the user reads or exports after a scan.
//!
//! ## Outputs
//! - CSV exports for duplicates, folder summaries and similar folders
//! - A whole-library summary, printable or serialisable as JSON
//! - Human readable byte sizes

mod export;

pub use export::{
    export_duplicates_csv, export_folder_summary_csv, export_similarity_csv, export_to_file,
};

use crate::core::comparator::{DedupEngine, DuplicateStatistics};
use crate::core::metadata::DATE_FORMAT;
use crate::core::store::{FolderStats, GlobalStats, ScanState};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Format a byte count with a binary unit, e.g. `1.5 MB`
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// When a root folder was last scanned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub directory: PathBuf,
    /// Local time, `YYYY-mm-dd HH:MM:SS`
    pub last_scan: String,
    pub file_count: usize,
}

impl From<&ScanState> for ScanRecord {
    fn from(state: &ScanState) -> Self {
        let local: DateTime<Local> = state.last_scan_time.into();
        Self {
            directory: state.directory.clone(),
            last_scan: local.format(DATE_FORMAT).to_string(),
            file_count: state.file_count,
        }
    }
}

/// Whole-library summary behind the `report` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryReport {
    pub database: PathBuf,
    /// Database file size in bytes
    pub database_size: u64,
    pub stats: GlobalStats,
    /// Extra copies per kind, beyond the one kept of each group
    pub duplicates: DuplicateStatistics,
    /// Per-folder counts, ordered by folder
    pub folders: BTreeMap<String, FolderStats>,
    pub scans: Vec<ScanRecord>,
}

impl LibraryReport {
    pub fn build(engine: &DedupEngine<'_>, database: PathBuf, database_size: u64) -> Self {
        Self {
            database,
            database_size,
            stats: engine.global_stats(),
            duplicates: engine.duplicate_statistics(),
            folders: engine.folder_stats(),
            scans: engine.scan_history().iter().map(ScanRecord::from).collect(),
        }
    }

    pub fn total_files(&self) -> u64 {
        self.stats.photos.files + self.stats.videos.files
    }

    pub fn total_wasted(&self) -> u64 {
        self.stats.photos.wasted_bytes + self.stats.videos.wasted_bytes
    }
}
