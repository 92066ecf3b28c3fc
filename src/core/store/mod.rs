//! # Store Module
//!
//! Durable index of every photo and video seen by the scanner.
//!
//! ## Layout
//! One table per media kind, keyed by absolute path, indexed on hash and
//! folder. Rows are only ever inserted (insert-or-ignore); a recorded hash
//! is never rewritten.
//!
//! ## Backends
//! - `SqliteStore` - SQLite file (or in-memory database for tests)

mod sqlite;
#[cfg(test)]
pub(crate) mod testing;
mod traits;

pub use sqlite::{SqliteStore, DB_FILE_NAME};
pub use traits::MediaStore;

use crate::core::classifier::MediaKind;
use crate::core::hasher::ContentDigest;
use crate::core::metadata::{PhotoMetadata, VideoMetadata};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Kind-specific columns of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaDetails {
    Photo(PhotoMetadata),
    Video(VideoMetadata),
}

impl MediaDetails {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaDetails::Photo(_) => MediaKind::Photo,
            MediaDetails::Video(_) => MediaKind::Video,
        }
    }

    pub fn photo(&self) -> Option<&PhotoMetadata> {
        match self {
            MediaDetails::Photo(meta) => Some(meta),
            MediaDetails::Video(_) => None,
        }
    }

    pub fn video(&self) -> Option<&VideoMetadata> {
        match self {
            MediaDetails::Video(meta) => Some(meta),
            MediaDetails::Photo(_) => None,
        }
    }
}

/// A hashed file ready to be written
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Absolute path
    pub path: PathBuf,
    pub size: u64,
    pub hash: ContentDigest,
    pub details: MediaDetails,
}

/// A stored photo or video row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Insertion id, ascending per table
    pub id: i64,
    pub kind: MediaKind,
    pub path: String,
    /// Direct parent directory of `path`
    pub folder: String,
    pub size: u64,
    /// Hex content digest
    pub hash: String,
    pub details: MediaDetails,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl FileRecord {
    /// File name component of the path
    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }
}

/// Duplicate groups of one kind: hash -> members ordered by path
pub type DuplicateGroupMap = BTreeMap<String, Vec<FileRecord>>;

/// Folder -> distinct hashes of the files directly inside it
pub type FolderHashIndex = BTreeMap<String, BTreeSet<String>>;

/// Whole-database figures for one media kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTotals {
    pub files: u64,
    pub total_size: u64,
    pub duplicate_groups: u64,
    /// Bytes recoverable by keeping one copy per duplicate group
    pub wasted_bytes: u64,
}

/// Whole-database figures for photos and videos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub photos: KindTotals,
    pub videos: KindTotals,
}

impl GlobalStats {
    pub fn for_kind(&self, kind: MediaKind) -> KindTotals {
        match kind {
            MediaKind::Photo => self.photos,
            MediaKind::Video => self.videos,
            MediaKind::Other => KindTotals::default(),
        }
    }
}

/// Per-folder figures for one media kind.
///
/// Every member of a duplicate group counts towards its folder, including
/// the copy that would be kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderKindStats {
    pub count: u64,
    pub duplicate_count: u64,
    pub duplicate_bytes: u64,
}

/// Per-folder figures for photos and videos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderStats {
    pub photos: FolderKindStats,
    pub videos: FolderKindStats,
}

/// Last scan of a root folder
#[derive(Debug, Clone)]
pub struct ScanState {
    /// Root folder that was scanned
    pub directory: PathBuf,
    /// When the scan finished
    pub last_scan_time: SystemTime,
    /// Media files discovered under the root
    pub file_count: usize,
}

/// Parent directory of a stored path, as stored in the `folder` column
pub fn folder_of(path: &Path) -> String {
    path.parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_is_direct_parent() {
        assert_eq!(folder_of(Path::new("/photos/2024/a.jpg")), "/photos/2024");
        assert_eq!(folder_of(Path::new("a.jpg")), "");
    }

    #[test]
    fn details_know_their_kind() {
        assert_eq!(
            MediaDetails::Photo(PhotoMetadata::default()).kind(),
            MediaKind::Photo
        );
        assert_eq!(
            MediaDetails::Video(VideoMetadata::default()).kind(),
            MediaKind::Video
        );
    }

    #[test]
    fn global_stats_for_other_is_zero() {
        let stats = GlobalStats {
            photos: KindTotals {
                files: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(stats.for_kind(MediaKind::Photo).files, 3);
        assert_eq!(stats.for_kind(MediaKind::Other), KindTotals::default());
    }
}
