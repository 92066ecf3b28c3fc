//! Store trait definition.

use super::{
    DuplicateGroupMap, FileRecord, FolderHashIndex, FolderStats, GlobalStats, NewFileRecord,
    ScanState,
};
use crate::core::classifier::MediaKind;
use crate::error::StoreError;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Everything the scanner and the reports need from a store.
///
/// There are no optional methods; every backend implements all of them.
pub trait MediaStore: Send + Sync {
    /// Insert records of one kind in a single transaction.
    ///
    /// Paths already present are silently skipped. Returns the number of
    /// rows actually inserted. On error nothing from this batch is kept.
    fn insert_batch(&self, kind: MediaKind, records: &[NewFileRecord])
        -> Result<usize, StoreError>;

    /// All records of one kind, in insertion order
    fn list_all(&self, kind: MediaKind) -> Result<Vec<FileRecord>, StoreError>;

    /// Records of one kind (or photos then videos), at most `limit` of them
    fn list(
        &self,
        kind: Option<MediaKind>,
        limit: Option<usize>,
    ) -> Result<Vec<FileRecord>, StoreError>;

    /// Every indexed path, photos and videos together
    fn indexed_paths(&self) -> Result<HashSet<String>, StoreError>;

    /// Hashes shared by at least two records of `kind`, members ordered by path
    fn duplicate_groups(&self, kind: MediaKind) -> Result<DuplicateGroupMap, StoreError>;

    fn global_stats(&self) -> Result<GlobalStats, StoreError>;

    fn folder_stats(&self) -> Result<BTreeMap<String, FolderStats>, StoreError>;

    /// Folder -> distinct hashes of files directly inside it (both kinds)
    fn folder_hash_index(&self) -> Result<FolderHashIndex, StoreError>;

    /// When a root folder was last scanned
    fn scan_state(&self, directory: &Path) -> Result<Option<ScanState>, StoreError>;

    fn record_scan_state(&self, state: &ScanState) -> Result<(), StoreError>;

    /// Every recorded root, most recently scanned first
    fn scan_states(&self) -> Result<Vec<ScanState>, StoreError>;

    /// Remove every record and scan state, keeping the schema
    fn clear(&self) -> Result<(), StoreError>;
}
