//! # Comparator Module
//!
//! Turns the index into duplicate reports and folder similarity.
//!
//! ## How It Works
//! - Exact duplicates: records of one kind sharing a content digest
//! - Master selection: one copy per group is kept according to a [`KeepPolicy`]
//! - Folder similarity: Jaccard index over the digests directly inside each folder
//! - Narrower views: duplicates inside one folder, duplicates spanning folders,
//!   the groups wasting the most space, and a two-folder content comparison
//!
//! The engine only reads from the store. A failed query is logged and
//! yields an empty (or zeroed) result so a report can always be printed.

mod policy;
mod similarity;

pub use policy::KeepPolicy;
pub use similarity::{
    folder_similarity, jaccard, FolderSimilarity, SimilarityOptions, DEFAULT_THRESHOLD,
};

use crate::core::classifier::MediaKind;
use crate::core::store::{
    FileRecord, FolderHashIndex, FolderStats, GlobalStats, MediaStore, ScanState,
};
use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Records of one kind that share a content digest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub kind: MediaKind,
    pub hash: String,
    /// Ordered by path, at least two
    pub members: Vec<FileRecord>,
    pub total_size: u64,
    /// Bytes freed by keeping only the smallest member
    pub wasted_bytes: u64,
}

impl DuplicateGroup {
    /// Build a group; `None` when fewer than two members share the hash
    pub fn new(kind: MediaKind, hash: String, mut members: Vec<FileRecord>) -> Option<Self> {
        if members.len() < 2 {
            return None;
        }
        members.sort_by(|a, b| a.path.cmp(&b.path));

        let total_size: u64 = members.iter().map(|m| m.size).sum();
        let min_size = members.iter().map(|m| m.size).min().unwrap_or(0);

        Some(Self {
            kind,
            hash,
            members,
            total_size,
            wasted_bytes: total_size - min_size,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Copies beyond the one that is kept
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Distinct folders holding a member
    pub fn folders(&self) -> BTreeSet<&str> {
        self.members.iter().map(|m| m.folder.as_str()).collect()
    }
}

/// Duplicate figures for one kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCounts {
    pub groups: u64,
    /// Members beyond the first of each group
    pub files: u64,
    pub wasted_bytes: u64,
}

impl DuplicateCounts {
    fn add(&mut self, group: &DuplicateGroup) {
        self.groups += 1;
        self.files += group.duplicate_count() as u64;
        self.wasted_bytes += group.wasted_bytes;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateStatistics {
    pub photos: DuplicateCounts,
    pub videos: DuplicateCounts,
}

impl DuplicateStatistics {
    pub fn total(&self) -> DuplicateCounts {
        DuplicateCounts {
            groups: self.photos.groups + self.videos.groups,
            files: self.photos.files + self.videos.files,
            wasted_bytes: self.photos.wasted_bytes + self.videos.wasted_bytes,
        }
    }
}

/// Content shared between two folders, counted in distinct digests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderComparison {
    pub folder1: String,
    pub folder2: String,
    pub folder1_total: usize,
    pub folder2_total: usize,
    pub shared: usize,
    pub unique_to_folder1: usize,
    pub unique_to_folder2: usize,
    /// Jaccard index, 0 when both folders are empty
    pub similarity: f64,
}

/// A duplicate group split into the copy to keep and the others
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub group: DuplicateGroup,
    pub master: FileRecord,
    /// Every other member, ordered by path
    pub duplicates: Vec<FileRecord>,
}

impl DuplicateReport {
    pub fn from_group(group: DuplicateGroup, policy: KeepPolicy) -> Option<Self> {
        let master = policy.select(&group.members)?.clone();
        let duplicates = group
            .members
            .iter()
            .filter(|m| m.id != master.id)
            .cloned()
            .collect();

        Some(Self {
            group,
            master,
            duplicates,
        })
    }
}

/// Read-only queries over a store
pub struct DedupEngine<'a> {
    store: &'a dyn MediaStore,
}

impl<'a> DedupEngine<'a> {
    pub fn new(store: &'a dyn MediaStore) -> Self {
        Self { store }
    }

    /// Duplicate groups of one kind, ordered by hash
    pub fn duplicate_groups(&self, kind: MediaKind) -> Vec<DuplicateGroup> {
        let groups = match self.store.duplicate_groups(kind) {
            Ok(groups) => groups,
            Err(e) => {
                warn!("Could not load {} duplicates: {}", kind.as_str(), e);
                return Vec::new();
            }
        };

        groups
            .into_iter()
            .filter_map(|(hash, members)| DuplicateGroup::new(kind, hash, members))
            .collect()
    }

    /// Duplicate groups of one kind with a master chosen by `policy`
    pub fn exact_duplicates(&self, kind: MediaKind, policy: KeepPolicy) -> Vec<DuplicateReport> {
        let reports: Vec<_> = self
            .duplicate_groups(kind)
            .into_iter()
            .filter_map(|group| DuplicateReport::from_group(group, policy))
            .collect();

        debug!(
            "{} {} duplicate groups (keep {})",
            reports.len(),
            kind.as_str(),
            policy
        );
        reports
    }

    /// Photo reports followed by video reports
    pub fn all_duplicates(&self, policy: KeepPolicy) -> Vec<DuplicateReport> {
        MediaKind::INDEXED
            .into_iter()
            .flat_map(|kind| self.exact_duplicates(kind, policy))
            .collect()
    }

    /// Photo groups followed by video groups
    pub fn all_groups(&self) -> Vec<DuplicateGroup> {
        MediaKind::INDEXED
            .into_iter()
            .flat_map(|kind| self.duplicate_groups(kind))
            .collect()
    }

    /// Groups whose every member sits directly inside `folder`
    pub fn duplicates_in_folder(&self, folder: &str) -> Vec<DuplicateGroup> {
        self.all_groups()
            .into_iter()
            .filter(|g| g.members.iter().all(|m| m.folder == folder))
            .collect()
    }

    /// Groups with members in more than one folder
    pub fn duplicates_across_folders(&self) -> Vec<DuplicateGroup> {
        self.all_groups()
            .into_iter()
            .filter(|g| g.folders().len() > 1)
            .collect()
    }

    /// The `limit` groups wasting the most space, largest first
    pub fn largest_duplicates(&self, limit: usize) -> Vec<DuplicateGroup> {
        let mut groups = self.all_groups();
        groups.sort_by(|a, b| b.wasted_bytes.cmp(&a.wasted_bytes));
        groups.truncate(limit);
        groups
    }

    pub fn duplicate_statistics(&self) -> DuplicateStatistics {
        let mut stats = DuplicateStatistics::default();
        for group in self.all_groups() {
            match group.kind {
                MediaKind::Video => stats.videos.add(&group),
                _ => stats.photos.add(&group),
            }
        }
        stats
    }

    /// Shared and unique digests of two folders (both kinds together)
    pub fn compare_folders(&self, folder1: &str, folder2: &str) -> FolderComparison {
        let index = self.folder_index();
        let empty = BTreeSet::new();
        let a = index.get(folder1).unwrap_or(&empty);
        let b = index.get(folder2).unwrap_or(&empty);
        let shared = a.intersection(b).count();

        FolderComparison {
            folder1: folder1.to_string(),
            folder2: folder2.to_string(),
            folder1_total: a.len(),
            folder2_total: b.len(),
            shared,
            unique_to_folder1: a.len() - shared,
            unique_to_folder2: b.len() - shared,
            similarity: jaccard(a, b),
        }
    }

    pub fn global_stats(&self) -> GlobalStats {
        self.store.global_stats().unwrap_or_else(|e| {
            warn!("Could not compute statistics: {}", e);
            GlobalStats::default()
        })
    }

    pub fn folder_stats(&self) -> BTreeMap<String, FolderStats> {
        self.store.folder_stats().unwrap_or_else(|e| {
            warn!("Could not compute folder statistics: {}", e);
            BTreeMap::new()
        })
    }

    pub fn scan_history(&self) -> Vec<ScanState> {
        self.store.scan_states().unwrap_or_else(|e| {
            warn!("Could not load scan history: {}", e);
            Vec::new()
        })
    }

    /// Records for listing, photos first
    pub fn list(&self, kind: Option<MediaKind>, limit: Option<usize>) -> Vec<FileRecord> {
        self.store.list(kind, limit).unwrap_or_else(|e| {
            warn!("Could not list records: {}", e);
            Vec::new()
        })
    }

    /// Folder pairs at or above the threshold.
    ///
    /// Only an invalid threshold is an error; a failed query gives no pairs.
    pub fn folder_similarity(
        &self,
        options: SimilarityOptions,
    ) -> Result<Vec<FolderSimilarity>, ReportError> {
        options.validate()?;
        folder_similarity(&self.folder_index(), options)
    }

    fn folder_index(&self) -> FolderHashIndex {
        self.store.folder_hash_index().unwrap_or_else(|e| {
            warn!("Could not load folder contents: {}", e);
            FolderHashIndex::new()
        })
    }
}
