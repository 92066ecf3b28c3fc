//! Event type definitions for progress reporting.

use crate::core::classifier::MediaKind;
use crate::core::scanner::ScanStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while indexing a folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Discovery (directory walk) events
    Scan(ScanEvent),
    /// Hashing pass events
    Hash(HashEvent),
}

/// Events during discovery of a root folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning of a root folder has started
    Started { root: PathBuf },
    /// Progress update while walking the tree
    Progress(ScanProgress),
    /// Walk finished; candidates are known
    Discovered {
        photos: usize,
        videos: usize,
        skipped: usize,
    },
    /// An entry below the root could not be read; the walk continues
    Error { path: PathBuf, message: String },
    /// The root folder has been fully indexed
    Completed { root: PathBuf, stats: ScanStats },
}

/// Progress information during the walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of directories entered so far
    pub directories_scanned: usize,
    /// Number of media files found so far
    pub files_found: usize,
    /// Directory being walked
    pub current_path: PathBuf,
}

/// Events during a hashing pass (one pass per media kind)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// A pass has started
    PassStarted { kind: MediaKind, total: usize },
    /// A file finished hashing (successfully or not)
    Progress(HashProgress),
    /// A file could not be hashed; it is left out of the index
    Failed { path: PathBuf, message: String },
    /// A batch was written to the store
    BatchFlushed {
        kind: MediaKind,
        batch_len: usize,
        inserted: usize,
    },
    /// A pass has finished
    PassCompleted {
        kind: MediaKind,
        processed: usize,
        failed: usize,
    },
}

/// Progress information during a hashing pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    pub kind: MediaKind,
    /// Files completed so far in this pass
    pub completed: usize,
    /// Files submitted to this pass
    pub total: usize,
    /// The file that just completed
    pub current_path: PathBuf,
}
