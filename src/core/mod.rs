//! # Core Module
//!
//! The front-end agnostic indexing engine.
//!
//! ## Modules
//! - `classifier` - Maps file extensions to photo / video / other
//! - `hasher` - Streams files through XXH3-128
//! - `metadata` - Extracts EXIF metadata from photos
//! - `scanner` - Walks folders and indexes new files in parallel
//! - `store` - SQLite index of every photo and video
//! - `comparator` - Duplicate groups, master selection, folder similarity
//! - `reporter` - CSV exports and library summaries

pub mod classifier;
pub mod comparator;
pub mod hasher;
pub mod metadata;
pub mod reporter;
pub mod scanner;
pub mod store;

// Re-export commonly used types
pub use classifier::{classify, MediaKind};
pub use comparator::{
    DedupEngine, DuplicateGroup, DuplicateReport, DuplicateStatistics, FolderComparison,
    KeepPolicy, SimilarityOptions,
};
pub use hasher::{ContentDigest, ContentHasher};
pub use metadata::PhotoMetadata;
pub use scanner::{ScanConfig, ScanStats, Scanner};
pub use store::{FileRecord, MediaStore, SqliteStore};
