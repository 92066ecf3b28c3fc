//! Store doubles for exercising error paths.

use super::{
    DuplicateGroupMap, FileRecord, FolderHashIndex, FolderStats, GlobalStats, MediaStore,
    NewFileRecord, ScanState,
};
use crate::core::classifier::MediaKind;
use crate::error::StoreError;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A store whose every call fails, as a corrupt database would
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    /// Number of `insert_batch` calls seen
    pub inserts: AtomicUsize,
}

impl FailingStore {
    fn fail<T>(&self, what: &str) -> Result<T, StoreError> {
        Err(StoreError::QueryFailed(format!("{what}: disk I/O error")))
    }

    pub(crate) fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

impl MediaStore for FailingStore {
    fn insert_batch(
        &self,
        _kind: MediaKind,
        _records: &[NewFileRecord],
    ) -> Result<usize, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.fail("insert")
    }

    fn list_all(&self, _kind: MediaKind) -> Result<Vec<FileRecord>, StoreError> {
        self.fail("list_all")
    }

    fn list(
        &self,
        _kind: Option<MediaKind>,
        _limit: Option<usize>,
    ) -> Result<Vec<FileRecord>, StoreError> {
        self.fail("list")
    }

    fn indexed_paths(&self) -> Result<HashSet<String>, StoreError> {
        self.fail("indexed_paths")
    }

    fn duplicate_groups(&self, _kind: MediaKind) -> Result<DuplicateGroupMap, StoreError> {
        self.fail("duplicate_groups")
    }

    fn global_stats(&self) -> Result<GlobalStats, StoreError> {
        self.fail("global_stats")
    }

    fn folder_stats(&self) -> Result<BTreeMap<String, FolderStats>, StoreError> {
        self.fail("folder_stats")
    }

    fn folder_hash_index(&self) -> Result<FolderHashIndex, StoreError> {
        self.fail("folder_hash_index")
    }

    fn scan_state(&self, _directory: &Path) -> Result<Option<ScanState>, StoreError> {
        self.fail("scan_state")
    }

    fn record_scan_state(&self, _state: &ScanState) -> Result<(), StoreError> {
        self.fail("record_scan_state")
    }

    fn scan_states(&self) -> Result<Vec<ScanState>, StoreError> {
        self.fail("scan_states")
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.fail("clear")
    }
}
