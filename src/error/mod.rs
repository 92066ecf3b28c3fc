//! # Error Module
//!
//! Error types for the media indexer.
//!
//! ## Layers
//! - **Setup** (`StoreError::OpenFailed`) - fatal, abort before scanning
//! - **Folder** (`ScanError`) - that folder is skipped, siblings continue
//! - **File** (`HashError`) - counted as failed, never propagated out of a scan
//! - **Persistence / query** (`StoreError`) - logged by the caller; reports degrade to empty

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that abort the scan of a single root folder
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Folder does not exist: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start hashing workers: {0}")]
    WorkerPool(String),
}

impl ScanError {
    /// Map an io error raised while opening the root folder
    pub(crate) fn from_root_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => ScanError::DirectoryNotFound { path },
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied { path },
            _ => ScanError::ReadDirectory { path, source },
        }
    }
}

/// Errors that occur while hashing a single file
#[derive(Error, Debug)]
pub enum HashError {
    #[error("File not found (it may have been moved or deleted): {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker panicked while processing {path}: {message}")]
    Panicked { path: PathBuf, message: String },
}

impl HashError {
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => HashError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => HashError::PermissionDenied { path },
            _ => HashError::Io { path, source },
        }
    }
}

/// Errors raised by the media store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Database handle is unusable at {path}. Delete this file and rescan.")]
    Corrupted { path: PathBuf },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}

/// Errors that occur while producing reports
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to export {path}: {reason}")]
    Export { path: PathBuf, reason: String },

    #[error("Invalid similarity threshold: {value} (must be between 0 and 1)")]
    InvalidThreshold { value: f64 },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;
