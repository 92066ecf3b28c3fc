//! Directory walking implementation using walkdir.

use super::filter::MediaFilter;
use super::ScanConfig;
use crate::core::classifier::MediaKind;
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent, ScanProgress};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Media files found under one root folder
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Canonical root that was walked
    pub root: PathBuf,
    pub photos: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
    /// Distinct direct parents of the discovered files
    pub folders: BTreeSet<PathBuf>,
    pub directories_scanned: usize,
    /// Entries below the root that could not be read
    pub unreadable: usize,
}

impl Discovery {
    pub fn candidates(&self, kind: MediaKind) -> &[PathBuf] {
        match kind {
            MediaKind::Photo => &self.photos,
            MediaKind::Video => &self.videos,
            MediaKind::Other => &[],
        }
    }

    pub fn total(&self) -> usize {
        self.photos.len() + self.videos.len()
    }
}

/// Resolve and check a root folder before anything else touches it
pub(crate) fn open_root(root: &Path) -> Result<PathBuf, ScanError> {
    let canonical =
        fs::canonicalize(root).map_err(|e| ScanError::from_root_io(root.to_path_buf(), e))?;

    if !canonical.is_dir() {
        return Err(ScanError::NotADirectory { path: canonical });
    }

    // Surface an unreadable root here rather than as a walk entry error
    fs::read_dir(&canonical).map_err(|e| ScanError::from_root_io(canonical.clone(), e))?;

    Ok(canonical)
}

/// Walk a root folder recursively and collect photo and video candidates.
///
/// Only fails for problems with the root itself; unreadable entries below
/// it are logged, reported as events and skipped.
pub(crate) fn discover(
    root: &Path,
    config: &ScanConfig,
    events: &EventSender,
) -> Result<Discovery, ScanError> {
    let root = open_root(root)?;
    let filter = MediaFilter::new().with_hidden(config.include_hidden);

    let mut discovery = Discovery {
        root: root.clone(),
        ..Default::default()
    };

    let walker = WalkDir::new(&root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| filter.should_visit(entry));

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                warn!("Skipping unreadable entry {}: {}", path.display(), e);
                events.send(Event::Scan(ScanEvent::Error {
                    path,
                    message: e.to_string(),
                }));
                discovery.unreadable += 1;
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            discovery.directories_scanned += 1;
            events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                directories_scanned: discovery.directories_scanned,
                files_found: discovery.total(),
                current_path: entry.path().to_path_buf(),
            })));
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let path = entry.into_path();
        match filter.kind_of(&path) {
            MediaKind::Photo => discovery.photos.push(path),
            MediaKind::Video => discovery.videos.push(path),
            MediaKind::Other => continue,
        }
    }

    discovery.folders = discovery
        .photos
        .iter()
        .chain(discovery.videos.iter())
        .filter_map(|p| p.parent().map(Path::to_path_buf))
        .collect();

    debug!(
        "Walked {}: {} photos, {} videos in {} directories",
        root.display(),
        discovery.photos.len(),
        discovery.videos.len(),
        discovery.directories_scanned
    );

    Ok(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::null_sender;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    fn walk(dir: &Path, config: &ScanConfig) -> Discovery {
        discover(dir, config, &null_sender()).unwrap()
    }

    #[test]
    fn walk_empty_directory_finds_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let discovery = walk(temp_dir.path(), &ScanConfig::default());

        assert_eq!(discovery.total(), 0);
        assert!(discovery.folders.is_empty());
        assert_eq!(discovery.directories_scanned, 1);
    }

    #[test]
    fn walk_splits_photos_and_videos() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "photo.jpg");
        create_file(temp_dir.path(), "photo.PNG");
        create_file(temp_dir.path(), "clip.mov");
        create_file(temp_dir.path(), "notes.txt");

        let discovery = walk(temp_dir.path(), &ScanConfig::default());

        assert_eq!(discovery.photos.len(), 2);
        assert_eq!(discovery.videos.len(), 1);
        assert!(discovery.videos[0].ends_with("clip.mov"));
    }

    #[test]
    fn walk_traverses_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("2024").join("july");
        fs::create_dir_all(&subdir).unwrap();

        create_file(temp_dir.path(), "root.jpg");
        create_file(&subdir, "nested.jpg");

        let discovery = walk(temp_dir.path(), &ScanConfig::default());

        assert_eq!(discovery.photos.len(), 2);
        assert_eq!(discovery.folders.len(), 2);
        assert!(discovery.photos.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn walk_prunes_hidden_entries_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let hidden_dir = temp_dir.path().join(".thumbnails");
        fs::create_dir(&hidden_dir).unwrap();

        create_file(temp_dir.path(), "visible.jpg");
        create_file(temp_dir.path(), ".hidden.jpg");
        create_file(&hidden_dir, "thumb.jpg");

        let discovery = walk(temp_dir.path(), &ScanConfig::default());
        assert_eq!(discovery.photos.len(), 1);
        assert!(discovery.photos[0].ends_with("visible.jpg"));

        let config = ScanConfig {
            include_hidden: true,
            ..Default::default()
        };
        assert_eq!(walk(temp_dir.path(), &config).photos.len(), 3);
    }

    #[test]
    fn hidden_root_is_still_walked() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join(".library");
        fs::create_dir(&root).unwrap();
        create_file(&root, "a.jpg");

        assert_eq!(walk(&root, &ScanConfig::default()).photos.len(), 1);
    }

    #[test]
    fn missing_root_is_directory_not_found() {
        let result = discover(
            Path::new("/nonexistent/path/12345"),
            &ScanConfig::default(),
            &null_sender(),
        );
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn file_root_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_file(temp_dir.path(), "a.jpg");

        let result = discover(&file, &ScanConfig::default(), &null_sender());
        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }
}
