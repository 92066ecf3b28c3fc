//! # Metadata Module
//!
//! Extracts EXIF metadata from photo files.
//!
//! ## Extracted Fields
//! - Date taken (DateTimeOriginal, falling back to DateTime / DateTimeDigitized)
//! - Camera model
//! - GPS latitude / longitude (decimal degrees, negative for S / W)
//! - Orientation
//! - Image dimensions (width x height)
//!
//! Extraction never fails: a file without EXIF yields empty metadata, and
//! an unreadable or malformed file yields empty metadata plus an `error`
//! string. The scanner indexes the file either way.

use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Storage / display format for capture times
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// EXIF date format: "YYYY:MM:DD HH:MM:SS"
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Extracted photo metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    /// Original capture date/time (camera local time)
    pub date_taken: Option<NaiveDateTime>,
    /// Camera model (e.g., "iPhone 15 Pro")
    pub camera_model: Option<String>,
    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    /// Image orientation (1-8, where 1 is normal)
    pub orientation: Option<u16>,
    /// Image width in pixels
    pub width: Option<u32>,
    /// Image height in pixels
    pub height: Option<u32>,
    /// Why extraction failed, if it did
    pub error: Option<String>,
}

impl PhotoMetadata {
    /// Empty metadata carrying an error marker
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Check if any metadata was extracted
    pub fn has_data(&self) -> bool {
        self.date_taken.is_some()
            || self.camera_model.is_some()
            || self.gps_lat.is_some()
            || self.orientation.is_some()
            || self.width.is_some()
            || self.height.is_some()
    }

    /// Get dimensions as a formatted string
    pub fn dimensions_display(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
            _ => None,
        }
    }
}

/// Video details stored alongside a video record.
///
/// Nothing extracts these yet; the columns exist so a future extractor can
/// fill them later without a schema change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Source of photo metadata for the scanner.
///
/// Implementations must not panic and must not fail; problems are
/// reported through [`PhotoMetadata::error`].
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> PhotoMetadata;
}

/// Reads EXIF with kamadak-exif
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifExtractor;

impl MetadataExtractor for ExifExtractor {
    fn extract(&self, path: &Path) -> PhotoMetadata {
        extract_metadata(path)
    }
}

/// Skips extraction entirely; every photo is indexed with empty metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataExtractor for NoMetadata {
    fn extract(&self, _path: &Path) -> PhotoMetadata {
        PhotoMetadata::default()
    }
}

/// Extract EXIF metadata from a photo file
pub fn extract_metadata(path: &Path) -> PhotoMetadata {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            return PhotoMetadata::failed(format!("Cannot open {}: {}", path.display(), e));
        }
    };

    let mut bufreader = BufReader::new(&file);
    let exif = match Reader::new().read_from_container(&mut bufreader) {
        Ok(exif) => exif,
        // No EXIF block at all is normal for PNGs, screenshots, edited files
        Err(exif::Error::NotFound(_)) => return PhotoMetadata::default(),
        Err(e) => {
            return PhotoMetadata::failed(format!(
                "Cannot read EXIF from {}: {}",
                path.display(),
                e
            ));
        }
    };

    metadata_from_exif(&exif)
}

fn metadata_from_exif(exif: &Exif) -> PhotoMetadata {
    let mut metadata = PhotoMetadata::default();

    metadata.date_taken = [Tag::DateTimeOriginal, Tag::DateTime, Tag::DateTimeDigitized]
        .iter()
        .filter_map(|tag| exif.get_field(*tag, In::PRIMARY))
        .find_map(|field| ascii_text(&field.value))
        .and_then(|s| NaiveDateTime::parse_from_str(&s, EXIF_DATE_FORMAT).ok());

    if let Some(field) = exif.get_field(Tag::Model, In::PRIMARY) {
        metadata.camera_model = ascii_text(&field.value);
    }

    if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
        if let Value::Short(ref vec) = field.value {
            metadata.orientation = vec.first().copied();
        }
    }

    // Prefer actual pixel dimensions
    if let Some(field) = exif.get_field(Tag::PixelXDimension, In::PRIMARY) {
        metadata.width = first_u32(&field.value);
    }
    if let Some(field) = exif.get_field(Tag::PixelYDimension, In::PRIMARY) {
        metadata.height = first_u32(&field.value);
    }
    if metadata.width.is_none() {
        if let Some(field) = exif.get_field(Tag::ImageWidth, In::PRIMARY) {
            metadata.width = first_u32(&field.value);
        }
    }
    if metadata.height.is_none() {
        if let Some(field) = exif.get_field(Tag::ImageLength, In::PRIMARY) {
            metadata.height = first_u32(&field.value);
        }
    }

    if let (Some(lat), Some(lon)) = (
        gps_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, 'S'),
        gps_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, 'W'),
    ) {
        metadata.gps_lat = Some(lat);
        metadata.gps_lon = Some(lon);
    }

    metadata
}

/// Decimal degrees from a degrees/minutes/seconds rational triple
fn gps_coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative_ref: char) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let Value::Rational(ref parts) = field.value else {
        return None;
    };
    if parts.len() < 3 {
        return None;
    }

    let component = |i: usize| {
        let r = parts[i];
        if r.denom == 0 {
            0.0
        } else {
            r.to_f64()
        }
    };
    let mut degrees = component(0) + component(1) / 60.0 + component(2) / 3600.0;

    let is_negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| ascii_text(&f.value))
        .map(|s| s.starts_with(negative_ref))
        .unwrap_or(false);
    if is_negative {
        degrees = -degrees;
    }

    Some(degrees)
}

/// First SHORT or LONG component
fn first_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

/// First ASCII component, NUL padding and blanks removed
fn ascii_text(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn metadata_default_has_no_data() {
        let meta = PhotoMetadata::default();
        assert!(!meta.has_data());
        assert!(meta.error.is_none());
    }

    #[test]
    fn failed_metadata_keeps_error_only() {
        let meta = PhotoMetadata::failed("boom");
        assert!(!meta.has_data());
        assert_eq!(meta.error.as_deref(), Some("boom"));
    }

    #[test]
    fn dimensions_display_format() {
        let meta = PhotoMetadata {
            width: Some(4032),
            height: Some(3024),
            ..Default::default()
        };
        assert_eq!(meta.dimensions_display(), Some("4032x3024".to_string()));
    }

    #[test]
    fn extract_from_nonexistent_reports_error() {
        let meta = extract_metadata(Path::new("/nonexistent/file.jpg"));
        assert!(!meta.has_data());
        assert!(meta.error.is_some());
    }

    #[test]
    fn extract_from_garbage_never_panics() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.jpg");
        File::create(&path)
            .unwrap()
            .write_all(b"this is not a jpeg at all")
            .unwrap();

        let meta = ExifExtractor.extract(&path);
        assert!(!meta.has_data());
    }

    #[test]
    fn no_metadata_extractor_is_empty() {
        let meta = NoMetadata.extract(Path::new("/anything.jpg"));
        assert_eq!(meta, PhotoMetadata::default());
    }
}
