//! # Scanner Module
//!
//! Indexes the photos and videos under a folder into a [`MediaStore`].
//!
//! ## How It Works
//! 1. Walk the folder (hidden entries pruned) and classify files by extension
//! 2. Drop paths that are already indexed (`skip_existing`)
//! 3. Photos, then videos: hash on a bounded worker pool, one pool per pass
//! 4. Write results in batches from a single consumer thread
//! 5. Record when the folder was scanned
//!
//! A folder that cannot be opened fails on its own; a file that cannot be
//! hashed is counted and logged; a batch that cannot be written is logged
//! and dropped. None of these stop the next folder.
//!
//! ## Example
//! ```rust,ignore
//! use media_dedup::core::scanner::{ScanConfig, Scanner};
//! use media_dedup::core::store::SqliteStore;
//!
//! let store = SqliteStore::open_in_dir(Path::new("."))?;
//! let mut scanner = Scanner::new(&store, ScanConfig::default());
//! let stats = scanner.scan(Path::new("/Users/photos"))?;
//! println!("{}", stats);
//! ```

mod filter;
mod pass;
mod walker;

pub use filter::MediaFilter;
pub use walker::Discovery;

use crate::core::classifier::MediaKind;
use crate::core::hasher::ContentHasher;
use crate::core::metadata::{ExifExtractor, MetadataExtractor};
use crate::core::store::{MediaStore, ScanState};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use pass::{run_pass, HashWorker, PassOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 200;
pub const MAX_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_THREADS: usize = 4;
pub const MAX_THREADS: usize = 32;

/// Configuration for a scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Records written per transaction (clamped to 1..=10000)
    pub batch_size: usize,
    /// Hashing threads per pass (clamped to 1..=32)
    pub threads: usize,
    /// Leave already indexed paths alone
    pub skip_existing: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Fixed hashing buffer in bytes (None = scale with file size)
    pub buffer_size: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            threads: DEFAULT_THREADS,
            skip_existing: true,
            include_hidden: false,
            follow_symlinks: false,
            buffer_size: None,
        }
    }
}

impl ScanConfig {
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn buffer_size(mut self, buffer_size: Option<usize>) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Same configuration with batch size and thread count in range
    pub fn clamped(mut self) -> Self {
        self.batch_size = self.batch_size.clamp(1, MAX_BATCH_SIZE);
        self.threads = self.threads.clamp(1, MAX_THREADS);
        self
    }
}

/// Counters for one media kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    /// Candidates found by the walk, including skipped ones
    pub discovered: usize,
    /// Rows actually inserted
    pub processed: usize,
    /// Already indexed, not hashed again
    pub skipped: usize,
    /// Could not be hashed
    pub failed: usize,
}

impl KindStats {
    fn merge(&mut self, other: &KindStats) {
        self.discovered += other.discovered;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Summary of one or more scanned folders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub photos: KindStats,
    pub videos: KindStats,
    /// Distinct folders directly holding a discovered file
    pub folders_scanned: usize,
    /// Batches that could not be written
    pub persistence_errors: usize,
}

impl ScanStats {
    pub fn for_kind(&self, kind: MediaKind) -> KindStats {
        match kind {
            MediaKind::Photo => self.photos,
            MediaKind::Video => self.videos,
            MediaKind::Other => KindStats::default(),
        }
    }

    fn for_kind_mut(&mut self, kind: MediaKind) -> &mut KindStats {
        match kind {
            MediaKind::Video => &mut self.videos,
            _ => &mut self.photos,
        }
    }

    /// Add another folder's figures to these
    pub fn merge(&mut self, other: &ScanStats) {
        self.photos.merge(&other.photos);
        self.videos.merge(&other.videos);
        self.folders_scanned += other.folders_scanned;
        self.persistence_errors += other.persistence_errors;
    }

    pub fn total_processed(&self) -> usize {
        self.photos.processed + self.videos.processed
    }

    pub fn total_failed(&self) -> usize {
        self.photos.failed + self.videos.failed
    }
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, stats) in [("Photos", self.photos), ("Videos", self.videos)] {
            writeln!(
                f,
                "{}: {} found, {} new, {} skipped, {} failed",
                label, stats.discovered, stats.processed, stats.skipped, stats.failed
            )?;
        }
        write!(f, "Folders: {}", self.folders_scanned)?;
        if self.persistence_errors > 0 {
            write!(f, " ({} batches failed to save)", self.persistence_errors)?;
        }
        Ok(())
    }
}

/// Result of scanning one folder in a multi-folder run
#[derive(Debug)]
pub struct FolderOutcome {
    pub folder: PathBuf,
    pub result: Result<ScanStats, ScanError>,
}

/// Result of [`Scanner::scan_many`]
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// One entry per requested folder, in order
    pub folders: Vec<FolderOutcome>,
    /// Merged figures of every folder that scanned
    pub total: ScanStats,
}

impl ScanSummary {
    /// Folders that could not be scanned
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ScanError)> + '_ {
        self.folders
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.folder.as_path(), e)))
    }
}

/// Indexes folders into a store
pub struct Scanner<'a> {
    store: &'a dyn MediaStore,
    config: ScanConfig,
    hasher: ContentHasher,
    extractor: Arc<dyn MetadataExtractor>,
    events: EventSender,
    /// Indexed paths, loaded on first use
    existing: Option<HashSet<String>>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner; batch size and thread count are clamped into range
    pub fn new(store: &'a dyn MediaStore, config: ScanConfig) -> Self {
        let config = config.clamped();
        let hasher = match config.buffer_size {
            Some(size) => ContentHasher::with_buffer_size(size),
            None => ContentHasher::new(),
        };

        Self {
            store,
            config,
            hasher,
            extractor: Arc::new(ExifExtractor),
            events: null_sender(),
            existing: None,
        }
    }

    /// Use a different photo metadata source
    pub fn with_extractor(mut self, extractor: impl MetadataExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Publish progress through this sender
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Walk a folder without hashing anything
    pub fn discover(&self, root: &Path) -> Result<Discovery, ScanError> {
        walker::discover(root, &self.config, &self.events)
    }

    /// Index every photo and video under `root`
    pub fn scan(&mut self, root: &Path) -> Result<ScanStats, ScanError> {
        self.events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));
        info!("Scanning {}", root.display());

        let discovery = self.discover(root)?;
        self.index(&discovery)
    }

    /// Hash and store the candidates of a finished walk
    pub fn index(&mut self, discovery: &Discovery) -> Result<ScanStats, ScanError> {
        let mut stats = ScanStats {
            folders_scanned: discovery.folders.len(),
            ..Default::default()
        };

        let mut pending: Vec<(MediaKind, Vec<PathBuf>)> = Vec::new();
        for kind in MediaKind::INDEXED {
            let candidates = discovery.candidates(kind);
            let fresh = self.without_indexed(candidates);

            let kind_stats = stats.for_kind_mut(kind);
            kind_stats.discovered = candidates.len();
            kind_stats.skipped = candidates.len() - fresh.len();
            pending.push((kind, fresh));
        }

        info!(
            "Found {} photos and {} videos under {} ({} already indexed)",
            stats.photos.discovered,
            stats.videos.discovered,
            discovery.root.display(),
            stats.photos.skipped + stats.videos.skipped
        );
        self.events.send(Event::Scan(ScanEvent::Discovered {
            photos: pending[0].1.len(),
            videos: pending[1].1.len(),
            skipped: stats.photos.skipped + stats.videos.skipped,
        }));

        let options = PassOptions {
            store: self.store,
            events: &self.events,
            threads: self.config.threads,
            batch_size: self.config.batch_size,
        };
        for (kind, candidates) in &pending {
            let worker = HashWorker {
                kind: *kind,
                hasher: self.hasher,
                extractor: Arc::clone(&self.extractor),
            };
            let failed_flushes = run_pass(&options, worker, candidates, stats.for_kind_mut(*kind))?;
            stats.persistence_errors += failed_flushes;
        }

        let state = ScanState {
            directory: discovery.root.clone(),
            last_scan_time: SystemTime::now(),
            file_count: discovery.total(),
        };
        if let Err(e) = self.store.record_scan_state(&state) {
            warn!("Could not record scan time for {}: {}", discovery.root.display(), e);
        }

        info!("Finished {}\n{}", discovery.root.display(), stats);
        self.events.send(Event::Scan(ScanEvent::Completed {
            root: discovery.root.clone(),
            stats: stats.clone(),
        }));

        Ok(stats)
    }

    /// Scan folders in order. A folder that fails is logged and reported;
    /// the remaining folders are still scanned.
    pub fn scan_many<P: AsRef<Path>>(&mut self, folders: &[P]) -> ScanSummary {
        let mut summary = ScanSummary::default();

        for folder in folders {
            let folder = folder.as_ref();
            let result = self.scan(folder);
            match &result {
                Ok(stats) => summary.total.merge(stats),
                Err(e) => {
                    warn!("Skipping {}: {}", folder.display(), e);
                    self.events.send(Event::Scan(ScanEvent::Error {
                        path: folder.to_path_buf(),
                        message: e.to_string(),
                    }));
                }
            }
            summary.folders.push(FolderOutcome {
                folder: folder.to_path_buf(),
                result,
            });
        }

        summary
    }

    /// Candidates whose path is not yet indexed (all of them without `skip_existing`)
    fn without_indexed(&mut self, candidates: &[PathBuf]) -> Vec<PathBuf> {
        if !self.config.skip_existing {
            return candidates.to_vec();
        }

        let existing = self.existing_paths();
        candidates
            .iter()
            .filter(|p| !existing.contains(&*p.to_string_lossy()))
            .cloned()
            .collect()
    }

    fn existing_paths(&mut self) -> &HashSet<String> {
        let store = self.store;
        self.existing.get_or_insert_with(|| match store.indexed_paths() {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Could not load indexed paths, rescanning everything: {}", e);
                HashSet::new()
            }
        })
    }
}
