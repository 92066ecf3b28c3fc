//! # Classifier Module
//!
//! Maps a path to a media kind by its extension.
//!
//! ## Supported Formats
//! - Photos: JPEG, PNG, WebP, TIFF, BMP, GIF, HEIC/HEIF and common RAW
//!   formats (CR2, NEF, ARW, DNG)
//! - Videos: MP4, MOV, AVI, MKV, WebM, FLV, WMV, M4V, MPEG, 3GP, OGV
//!
//! Classification never looks at file content: a video renamed to
//! `.jpg` is a photo as far as the index is concerned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Photo extensions, lowercase, without the dot
pub const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "tiff", "tif", "bmp", "gif", "heic", "heif", "raw", "cr2",
    "nef", "arw", "dng",
];

/// Video extensions, lowercase, without the dot
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "webm", "flv", "wmv", "m4v", "mpg", "mpeg", "3gp", "ogv",
];

/// Kind of media a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Other,
}

impl MediaKind {
    /// The two kinds that are indexed, in scan order
    pub const INDEXED: [MediaKind; 2] = [MediaKind::Photo, MediaKind::Video];

    /// Detect kind from a file extension (case-insensitive, no dot)
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Photo
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }

    /// Whether files of this kind are indexed
    pub fn is_media(&self) -> bool {
        !matches!(self, MediaKind::Other)
    }

    /// Lowercase label used in reports and CSV exports
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Other => "other",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a path by its extension
pub fn classify(path: &Path) -> MediaKind {
    path.extension()
        .and_then(|e| e.to_str())
        .map(MediaKind::from_extension)
        .unwrap_or(MediaKind::Other)
}
