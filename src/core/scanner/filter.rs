//! Entry filtering for the directory walk.

use crate::core::classifier::{classify, MediaKind};
use std::ffi::OsStr;
use std::path::Path;
use walkdir::DirEntry;

/// Decides which walk entries are descended into and which files are candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaFilter {
    /// Whether to include hidden files and directories
    include_hidden: bool,
}

impl MediaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include hidden files and directories (name starts with `.`)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Whether the walk should yield (and, for directories, enter) this entry.
    ///
    /// The root itself is never pruned, even when its own name is hidden.
    pub fn should_visit(&self, entry: &DirEntry) -> bool {
        entry.depth() == 0 || self.include_hidden || !is_hidden(entry.file_name())
    }

    /// Media kind of a candidate file; hidden files are `Other` unless included
    pub fn kind_of(&self, path: &Path) -> MediaKind {
        if !self.include_hidden && path.file_name().map(is_hidden).unwrap_or(false) {
            return MediaKind::Other;
        }
        classify(path)
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().map(|n| n.starts_with('.')).unwrap_or(false)
}
