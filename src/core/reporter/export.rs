//! CSV exports for duplicate, folder and similarity reports.

use crate::core::comparator::{DuplicateReport, FolderSimilarity};
use crate::core::store::FolderStats;
use crate::error::ReportError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct DuplicateRow<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    hash: &'a str,
    master: &'a str,
    duplicate: &'a str,
    /// Bytes
    size: u64,
}

#[derive(Serialize)]
struct FolderRow<'a> {
    folder: &'a str,
    total_photos: u64,
    duplicate_photos: u64,
    total_videos: u64,
    duplicate_videos: u64,
}

#[derive(Serialize)]
struct SimilarityRow<'a> {
    folder1: &'a str,
    folder2: &'a str,
    similarity: String,
    intersection: usize,
    union: usize,
}

/// One row per non-master copy: `type,hash,master,duplicate,size`
pub fn export_duplicates_csv<W: Write>(
    reports: &[DuplicateReport],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv = writer_with_header(writer, &["type", "hash", "master", "duplicate", "size"])?;

    for report in reports {
        for duplicate in &report.duplicates {
            csv.serialize(DuplicateRow {
                kind: report.group.kind.as_str(),
                hash: &report.group.hash,
                master: &report.master.path,
                duplicate: &duplicate.path,
                size: duplicate.size,
            })?;
        }
    }

    csv.flush()?;
    Ok(())
}

/// `folder,total_photos,duplicate_photos,total_videos,duplicate_videos`
pub fn export_folder_summary_csv<W: Write>(
    folders: &BTreeMap<String, FolderStats>,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv = writer_with_header(
        writer,
        &[
            "folder",
            "total_photos",
            "duplicate_photos",
            "total_videos",
            "duplicate_videos",
        ],
    )?;

    for (folder, stats) in folders {
        csv.serialize(FolderRow {
            folder,
            total_photos: stats.photos.count,
            duplicate_photos: stats.photos.duplicate_count,
            total_videos: stats.videos.count,
            duplicate_videos: stats.videos.duplicate_count,
        })?;
    }

    csv.flush()?;
    Ok(())
}

/// `folder1,folder2,similarity,intersection,union`, score to four decimals
pub fn export_similarity_csv<W: Write>(
    pairs: &[FolderSimilarity],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv = writer_with_header(
        writer,
        &["folder1", "folder2", "similarity", "intersection", "union"],
    )?;

    for pair in pairs {
        csv.serialize(SimilarityRow {
            folder1: &pair.folder1,
            folder2: &pair.folder2,
            similarity: format!("{:.4}", pair.similarity),
            intersection: pair.intersection,
            union: pair.union,
        })?;
    }

    csv.flush()?;
    Ok(())
}

/// Create `path` and hand it to one of the exporters above
pub fn export_to_file<F>(path: &Path, export: F) -> Result<(), ReportError>
where
    F: FnOnce(File) -> Result<(), csv::Error>,
{
    let to_report_error = |reason: String| ReportError::Export {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| to_report_error(e.to_string()))?;
    }
    let file = File::create(path).map_err(|e| to_report_error(e.to_string()))?;
    export(file).map_err(|e| to_report_error(e.to_string()))
}

/// CSV writer whose header row is already written, even if no record follows
fn writer_with_header<W: Write>(
    writer: W,
    columns: &[&str],
) -> Result<csv::Writer<W>, csv::Error> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(columns)?;
    Ok(csv)
}
