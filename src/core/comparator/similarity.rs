//! Folder similarity by Jaccard index over content hashes.
//!
//! Two folders holding the same files (by content) score 1.0; folders
//! sharing nothing score 0.0. Only files directly inside a folder count,
//! never its subfolders.

use crate::core::store::FolderHashIndex;
use crate::error::ReportError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Options for [`folder_similarity`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityOptions {
    /// Minimum score to report, in [0, 1]
    pub threshold: f64,
    /// Folders with fewer distinct hashes are never compared (at least 1)
    pub min_hashes: usize,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_hashes: 1,
        }
    }
}

impl SimilarityOptions {
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn min_hashes(mut self, min_hashes: usize) -> Self {
        self.min_hashes = min_hashes;
        self
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ReportError::InvalidThreshold {
                value: self.threshold,
            });
        }
        Ok(())
    }
}

/// A pair of folders and how much content they share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderSimilarity {
    /// Lexicographically smaller folder of the pair
    pub folder1: String,
    pub folder2: String,
    /// |intersection| / |union|
    pub similarity: f64,
    pub intersection: usize,
    pub union: usize,
}

/// Jaccard index of two hash sets (0.0 when both are empty)
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Score folder pairs and keep those at or above the threshold.
///
/// Results are sorted by descending score, then by folder names.
pub fn folder_similarity(
    index: &FolderHashIndex,
    options: SimilarityOptions,
) -> Result<Vec<FolderSimilarity>, ReportError> {
    options.validate()?;
    let min_hashes = options.min_hashes.max(1);

    let folders: Vec<(&String, &BTreeSet<String>)> = index
        .iter()
        .filter(|(_, hashes)| hashes.len() >= min_hashes)
        .collect();

    let mut results = if options.threshold > 0.0 {
        shared_pairs(&folders, options.threshold)
    } else {
        all_pairs(&folders)
    };

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.folder1.cmp(&b.folder1))
            .then_with(|| a.folder2.cmp(&b.folder2))
    });

    Ok(results)
}

fn pair(
    (name_a, set_a): (&String, &BTreeSet<String>),
    (name_b, set_b): (&String, &BTreeSet<String>),
    intersection: usize,
) -> FolderSimilarity {
    let union = set_a.len() + set_b.len() - intersection;
    FolderSimilarity {
        folder1: name_a.clone(),
        folder2: name_b.clone(),
        similarity: intersection as f64 / union as f64,
        intersection,
        union,
    }
}

/// Pairs sharing at least one hash, found through a hash -> folders index.
///
/// Disjoint pairs score 0, so they can only matter when the threshold is 0.
fn shared_pairs(
    folders: &[(&String, &BTreeSet<String>)],
    threshold: f64,
) -> Vec<FolderSimilarity> {
    let mut holders: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, (_, hashes)) in folders.iter().enumerate() {
        for hash in hashes.iter() {
            holders.entry(hash.as_str()).or_default().push(i);
        }
    }

    // Folder indices are ascending within each list, so i < j
    let mut shared: HashMap<(usize, usize), usize> = HashMap::new();
    for indices in holders.values() {
        for (pos, &i) in indices.iter().enumerate() {
            for &j in &indices[pos + 1..] {
                *shared.entry((i, j)).or_insert(0) += 1;
            }
        }
    }

    shared
        .into_iter()
        .map(|((i, j), intersection)| pair(folders[i], folders[j], intersection))
        .filter(|s| s.similarity >= threshold)
        .collect()
}

fn all_pairs(folders: &[(&String, &BTreeSet<String>)]) -> Vec<FolderSimilarity> {
    (0..folders.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            (i + 1..folders.len()).map(move |j| {
                let intersection = folders[i].1.intersection(folders[j].1).count();
                pair(folders[i], folders[j], intersection)
            })
        })
        .collect()
}
