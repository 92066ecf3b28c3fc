//! One hashing pass: a bounded worker pool feeding a single batch writer.
//!
//! Workers hash files in parallel and send outcomes over a crossbeam
//! channel. The thread that started the pass is the only consumer; it owns
//! the pending batch, the counters and every store write.

use super::KindStats;
use crate::core::classifier::MediaKind;
use crate::core::hasher::ContentHasher;
use crate::core::metadata::{MetadataExtractor, VideoMetadata};
use crate::core::store::{MediaDetails, MediaStore, NewFileRecord};
use crate::error::{HashError, ScanError};
use crate::events::{Event, EventSender, HashEvent, HashProgress};
use crossbeam_channel::bounded;
use rayon::prelude::*;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What a worker produced for one file
enum Outcome {
    Hashed(NewFileRecord),
    Failed { path: PathBuf, error: HashError },
}

/// Per-file work shared by every thread of the pool
pub(super) struct HashWorker {
    pub kind: MediaKind,
    pub hasher: ContentHasher,
    pub extractor: Arc<dyn MetadataExtractor>,
}

impl HashWorker {
    /// Hash one file. A panic (e.g. in a metadata parser) fails only this file.
    fn process(&self, path: &Path) -> Outcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.build_record(path)))
            .unwrap_or_else(|payload| {
                Err(HashError::Panicked {
                    path: path.to_path_buf(),
                    message: panic_message(payload.as_ref()),
                })
            });

        match result {
            Ok(record) => Outcome::Hashed(record),
            Err(error) => Outcome::Failed {
                path: path.to_path_buf(),
                error,
            },
        }
    }

    fn build_record(&self, path: &Path) -> Result<NewFileRecord, HashError> {
        let size = fs::metadata(path)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))?
            .len();
        let hash = self.hasher.hash_file(path)?;

        let details = match self.kind {
            MediaKind::Video => MediaDetails::Video(VideoMetadata::default()),
            _ => {
                let metadata = self.extractor.extract(path);
                if let Some(ref reason) = metadata.error {
                    debug!("No metadata for {}: {}", path.display(), reason);
                }
                MediaDetails::Photo(metadata)
            }
        };

        Ok(NewFileRecord {
            path: path.to_path_buf(),
            size,
            hash,
            details,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Accumulates records and flushes them to the store in batches
struct BatchWriter<'a> {
    store: &'a dyn MediaStore,
    events: &'a EventSender,
    kind: MediaKind,
    batch_size: usize,
    pending: Vec<NewFileRecord>,
    inserted: usize,
    failed_flushes: usize,
}

impl<'a> BatchWriter<'a> {
    fn new(
        store: &'a dyn MediaStore,
        events: &'a EventSender,
        kind: MediaKind,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            events,
            kind,
            batch_size,
            pending: Vec::with_capacity(batch_size),
            inserted: 0,
            failed_flushes: 0,
        }
    }

    fn push(&mut self, record: NewFileRecord) {
        self.pending.push(record);
        if self.pending.len() >= self.batch_size {
            self.flush();
        }
    }

    /// Write the pending batch. A failed batch is dropped, not retried.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let batch_len = self.pending.len();
        match self.store.insert_batch(self.kind, &self.pending) {
            Ok(inserted) => {
                self.inserted += inserted;
                info!(
                    "Saved {} {}s ({} new)",
                    batch_len,
                    self.kind.as_str(),
                    inserted
                );
                self.events.send(Event::Hash(HashEvent::BatchFlushed {
                    kind: self.kind,
                    batch_len,
                    inserted,
                }));
            }
            Err(e) => {
                error!(
                    "Failed to save batch of {} {}s: {}",
                    batch_len,
                    self.kind.as_str(),
                    e
                );
                self.failed_flushes += 1;
            }
        }
        self.pending.clear();
    }

    /// Flush the partial batch and return (rows inserted, failed flushes)
    fn finish(mut self) -> (usize, usize) {
        self.flush();
        (self.inserted, self.failed_flushes)
    }
}

/// Settings for one pass
pub(super) struct PassOptions<'a> {
    pub store: &'a dyn MediaStore,
    pub events: &'a EventSender,
    pub threads: usize,
    pub batch_size: usize,
}

/// Hash `candidates` and write them to the store.
///
/// Adds to `stats.processed` and `stats.failed`; returns the number of
/// failed flushes. Only building the pool can fail.
pub(super) fn run_pass(
    options: &PassOptions<'_>,
    worker: HashWorker,
    candidates: &[PathBuf],
    stats: &mut KindStats,
) -> Result<usize, ScanError> {
    let kind = worker.kind;
    let total = candidates.len();
    if total == 0 {
        return Ok(0);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .thread_name(move |i| format!("hash-{}-{}", kind.as_str(), i))
        .build()
        .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

    info!(
        "Hashing {} {}s with {} threads",
        total,
        kind.as_str(),
        options.threads
    );
    options
        .events
        .send(Event::Hash(HashEvent::PassStarted { kind, total }));

    let mut writer = BatchWriter::new(options.store, options.events, kind, options.batch_size);
    let mut completed = 0;
    let mut failed = 0;

    let (sender, receiver) = bounded::<Outcome>(options.threads * 4);

    std::thread::scope(|scope| {
        scope.spawn(move || {
            pool.install(|| {
                candidates.par_iter().for_each_with(sender, |sender, path| {
                    // The receiver outlives the pool; a send only fails if it panicked
                    let _ = sender.send(worker.process(path));
                });
            });
        });

        for outcome in receiver.iter() {
            completed += 1;
            let current_path = match outcome {
                Outcome::Hashed(record) => {
                    let path = record.path.clone();
                    writer.push(record);
                    path
                }
                Outcome::Failed { path, error } => {
                    warn!("Failed to hash {}: {}", path.display(), error);
                    failed += 1;
                    options.events.send(Event::Hash(HashEvent::Failed {
                        path: path.clone(),
                        message: error.to_string(),
                    }));
                    path
                }
            };

            options
                .events
                .send(Event::Hash(HashEvent::Progress(HashProgress {
                    kind,
                    completed,
                    total,
                    current_path,
                })));
        }
    });

    let (inserted, failed_flushes) = writer.finish();
    stats.processed += inserted;
    stats.failed += failed;

    info!(
        "Finished {}s: {} new, {} failed",
        kind.as_str(),
        inserted,
        failed
    );
    options.events.send(Event::Hash(HashEvent::PassCompleted {
        kind,
        processed: inserted,
        failed,
    }));

    Ok(failed_flushes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{NoMetadata, PhotoMetadata};
    use crate::core::store::testing::FailingStore;
    use crate::core::store::SqliteStore;
    use crate::events::{null_sender, EventChannel};
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(content).unwrap();
        path
    }

    fn worker(kind: MediaKind) -> HashWorker {
        HashWorker {
            kind,
            hasher: ContentHasher::new(),
            extractor: Arc::new(NoMetadata),
        }
    }

    #[test]
    fn pass_inserts_every_hashed_file() {
        let dir = TempDir::new().unwrap();
        let files: Vec<_> = (0..7)
            .map(|i| write_file(dir.path(), &format!("{i}.jpg"), format!("photo {i}").as_bytes()))
            .collect();

        let store = SqliteStore::open_in_memory().unwrap();
        let events = null_sender();
        let options = PassOptions {
            store: &store,
            events: &events,
            threads: 3,
            batch_size: 2,
        };

        let mut stats = KindStats::default();
        let failed_flushes = run_pass(&options, worker(MediaKind::Photo), &files, &mut stats).unwrap();

        assert_eq!(failed_flushes, 0);
        assert_eq!(stats.processed, 7);
        assert_eq!(stats.failed, 0);
        assert_eq!(store.list_all(MediaKind::Photo).unwrap().len(), 7);
    }

    #[test]
    fn missing_file_is_counted_as_failed() {
        let dir = TempDir::new().unwrap();
        let present = write_file(dir.path(), "a.mp4", b"video");
        let missing = dir.path().join("gone.mp4");

        let store = SqliteStore::open_in_memory().unwrap();
        let (events, receiver) = EventChannel::new();
        let options = PassOptions {
            store: &store,
            events: &events,
            threads: 1,
            batch_size: 200,
        };

        let mut stats = KindStats::default();
        run_pass(
            &options,
            worker(MediaKind::Video),
            &[present, missing.clone()],
            &mut stats,
        )
        .unwrap();
        drop(events);

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.failed, 1);

        let failures: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Hash(HashEvent::Failed { path, .. }) => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(failures, vec![missing]);
    }

    #[test]
    fn empty_pass_touches_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let events = null_sender();
        let options = PassOptions {
            store: &store,
            events: &events,
            threads: 4,
            batch_size: 10,
        };

        let mut stats = KindStats::default();
        assert_eq!(run_pass(&options, worker(MediaKind::Photo), &[], &mut stats).unwrap(), 0);
        assert_eq!(stats, KindStats::default());
    }

    #[test]
    fn batch_writer_flushes_at_batch_size() {
        let store = SqliteStore::open_in_memory().unwrap();
        let (events, receiver) = EventChannel::new();

        let mut writer = BatchWriter::new(&store, &events, MediaKind::Photo, 2);
        for i in 0..5 {
            writer.push(NewFileRecord {
                path: PathBuf::from(format!("/p/{i}.jpg")),
                size: 1,
                hash: crate::core::hasher::hash_bytes(&[i]),
                details: MediaDetails::Photo(Default::default()),
            });
        }
        assert_eq!(writer.finish(), (5, 0));
        drop(events);

        let flushes: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Hash(HashEvent::BatchFlushed { batch_len, .. }) => Some(batch_len),
                _ => None,
            })
            .collect();
        assert_eq!(flushes, vec![2, 2, 1]);
    }

    #[test]
    fn failed_flush_is_counted_and_not_retried() {
        let dir = TempDir::new().unwrap();
        let files: Vec<_> = (0..5)
            .map(|i| write_file(dir.path(), &format!("{i}.jpg"), &[i]))
            .collect();

        let store = FailingStore::default();
        let (events, receiver) = EventChannel::new();
        let options = PassOptions {
            store: &store,
            events: &events,
            threads: 2,
            batch_size: 2,
        };

        let mut stats = KindStats::default();
        let failed_flushes =
            run_pass(&options, worker(MediaKind::Photo), &files, &mut stats).unwrap();
        drop(events);

        // 2 + 2 + 1
        assert_eq!(failed_flushes, 3);
        assert_eq!(store.insert_calls(), 3);
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.failed, 0);
        assert!(!receiver
            .iter()
            .any(|e| matches!(e, Event::Hash(HashEvent::BatchFlushed { .. }))));
    }

    struct PanicsOn(&'static str);

    impl MetadataExtractor for PanicsOn {
        fn extract(&self, path: &Path) -> PhotoMetadata {
            if path.ends_with(self.0) {
                panic!("malformed EXIF block");
            }
            PhotoMetadata::default()
        }
    }

    #[test]
    fn panicking_extractor_fails_only_that_file() {
        let dir = TempDir::new().unwrap();
        let good = write_file(dir.path(), "good.jpg", b"good");
        let bad = write_file(dir.path(), "bad.jpg", b"bad");
        let other = write_file(dir.path(), "other.jpg", b"other");

        let store = SqliteStore::open_in_memory().unwrap();
        let (events, receiver) = EventChannel::new();
        let options = PassOptions {
            store: &store,
            events: &events,
            threads: 2,
            batch_size: 10,
        };
        let worker = HashWorker {
            kind: MediaKind::Photo,
            hasher: ContentHasher::new(),
            extractor: Arc::new(PanicsOn("bad.jpg")),
        };

        let mut stats = KindStats::default();
        run_pass(&options, worker, &[good, bad.clone(), other], &mut stats).unwrap();
        drop(events);

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.failed, 1);

        let failures: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Hash(HashEvent::Failed { path, message }) => Some((path, message)),
                _ => None,
            })
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, bad);
        assert!(failures[0].1.contains("malformed EXIF block"));
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
