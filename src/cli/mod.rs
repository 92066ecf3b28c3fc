//! # CLI Module
//!
//! Command-line interface for the media indexer.
//!
//! ## Usage
//! ```bash
//! # Index one or more folders into ./photo_dedup.db
//! photo-dedup scan ~/Pictures /Volumes/Backup/Photos
//!
//! # Exact duplicates, keeping the largest copy, exported to CSV
//! photo-dedup dedup --keep largest --export duplicates.csv
//!
//! # Folders sharing at least 80% of their files
//! photo-dedup folder-similar --threshold 0.8
//!
//! # What two folders have in common
//! photo-dedup compare-folders ~/Pictures/2023 /Volumes/Backup/2023
//! ```

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_dedup::core::classifier::MediaKind;
use media_dedup::core::comparator::{
    DedupEngine, DuplicateGroup, DuplicateReport, KeepPolicy, SimilarityOptions,
    DEFAULT_THRESHOLD,
};
use media_dedup::core::reporter::{
    export_duplicates_csv, export_folder_summary_csv, export_similarity_csv, export_to_file,
    human_size, LibraryReport,
};
use media_dedup::core::scanner::{
    ScanConfig, ScanSummary, Scanner, DEFAULT_BATCH_SIZE, DEFAULT_THREADS, MAX_BATCH_SIZE,
    MAX_THREADS,
};
use media_dedup::core::store::{FolderStats, MediaStore, SqliteStore, DB_FILE_NAME};
use media_dedup::error::{DedupError, Result};
use media_dedup::events::{Event, EventChannel, HashEvent, ScanEvent};
use media_dedup::{init_tracing, LogConfig};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{info, warn};

/// Photo Dedup - index media by content and find exact duplicates
#[derive(Parser, Debug)]
#[command(name = "photo-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Write the log to this file instead of a timestamped one
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long, global = true)]
    no_file_log: bool,

    /// Show debug messages on the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct DbArgs {
    /// Directory holding photo_dedup.db
    #[arg(long, default_value = ".")]
    db_path: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index photos and videos under one or more folders
    Scan {
        /// Folders to scan
        folders: Vec<PathBuf>,

        #[command(flatten)]
        db: DbArgs,

        /// File with one folder per line (blank lines and # comments ignored)
        #[arg(long)]
        folder_list: Option<PathBuf>,

        /// Records written per transaction (1-10000)
        #[arg(
            long,
            default_value_t = DEFAULT_BATCH_SIZE,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_BATCH_SIZE as u64)
        )]
        batch: usize,

        /// Hashing threads (1-32)
        #[arg(
            long,
            default_value_t = DEFAULT_THREADS,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_THREADS as u64)
        )]
        threads: usize,

        /// Empty the index before scanning
        #[arg(long)]
        fresh: bool,

        /// Hash files again even if their path is already indexed
        #[arg(long)]
        no_skip_existing: bool,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,
    },

    /// List exact duplicates and the copy that would be kept
    Dedup {
        #[command(flatten)]
        db: DbArgs,

        /// Write one row per duplicate copy to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Which copy to keep
        #[arg(long, default_value = "first")]
        keep: Keep,

        /// Only groups whose every copy is directly inside this folder
        #[arg(long, conflicts_with = "across_folders")]
        folder: Option<PathBuf>,

        /// Only groups with copies in more than one folder
        #[arg(long)]
        across_folders: bool,

        /// Only the N groups wasting the most space
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// Per-folder file and duplicate counts
    FolderSummary {
        #[command(flatten)]
        db: DbArgs,

        /// Write the summary to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Pairs of folders holding largely the same files
    FolderSimilar {
        #[command(flatten)]
        db: DbArgs,

        /// Minimum Jaccard similarity, between 0 and 1
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        /// Ignore folders with fewer distinct files than this
        #[arg(long, default_value_t = 1)]
        min_files: usize,

        /// Write the pairs to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Shared and unique files of two folders
    CompareFolders {
        folder1: PathBuf,
        folder2: PathBuf,

        #[command(flatten)]
        db: DbArgs,
    },

    /// Show indexed files
    List {
        #[command(flatten)]
        db: DbArgs,

        /// Which kind of media to show
        #[arg(long = "type", value_name = "TYPE", default_value = "all")]
        kind: Kind,

        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Library totals, wasted space and scan history
    Report {
        #[command(flatten)]
        db: DbArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compact the database file
    Vacuum {
        #[command(flatten)]
        db: DbArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Keep {
    /// Indexed first
    First,
    /// Largest file
    Largest,
    /// Latest capture time
    Newest,
}

impl From<Keep> for KeepPolicy {
    fn from(keep: Keep) -> Self {
        match keep {
            Keep::First => KeepPolicy::First,
            Keep::Largest => KeepPolicy::Largest,
            Keep::Newest => KeepPolicy::Newest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    All,
    #[value(name = "photos", alias = "photo")]
    Photos,
    #[value(name = "videos", alias = "video")]
    Videos,
}

impl Kind {
    fn media_kind(self) -> Option<MediaKind> {
        match self {
            Kind::All => None,
            Kind::Photos => Some(MediaKind::Photo),
            Kind::Videos => Some(MediaKind::Video),
        }
    }
}

/// Which duplicate groups `dedup` reports
#[derive(Debug, Clone, Default, PartialEq)]
struct DedupScope {
    folder: Option<String>,
    across_folders: bool,
    top: Option<usize>,
}

impl DedupScope {
    fn groups(&self, engine: &DedupEngine<'_>) -> Vec<DuplicateGroup> {
        let mut groups = match (&self.folder, self.across_folders, self.top) {
            (None, false, Some(limit)) => return engine.largest_duplicates(limit),
            (Some(folder), _, _) => engine.duplicates_in_folder(folder),
            (None, true, _) => engine.duplicates_across_folders(),
            (None, false, None) => engine.all_groups(),
        };
        if let Some(limit) = self.top {
            groups.sort_by(|a, b| b.wasted_bytes.cmp(&a.wasted_bytes));
            groups.truncate(limit);
        }
        groups
    }
}

/// Folders are stored canonicalized; match that when the folder still exists
fn folder_key(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

impl Commands {
    fn db_path(&self) -> &Path {
        match self {
            Commands::Scan { db, .. }
            | Commands::Dedup { db, .. }
            | Commands::FolderSummary { db, .. }
            | Commands::FolderSimilar { db, .. }
            | Commands::CompareFolders { db, .. }
            | Commands::List { db, .. }
            | Commands::Report { db, .. }
            | Commands::Vacuum { db } => &db.db_path,
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        verbose: cli.verbose,
        log_file: cli.log_file.clone(),
        file_logging: !cli.no_file_log,
    };
    if let Some(path) = init_tracing(&log_config, cli.command.db_path())? {
        info!("Logging to {}", path.display());
    }

    let term = Term::stdout();
    match cli.command {
        Commands::Scan {
            folders,
            db,
            folder_list,
            batch,
            threads,
            fresh,
            no_skip_existing,
            include_hidden,
        } => {
            let config = ScanConfig::default()
                .batch_size(batch)
                .threads(threads)
                .skip_existing(!no_skip_existing)
                .include_hidden(include_hidden);
            run_scan(
                &term,
                folders,
                folder_list.as_deref(),
                &db,
                config,
                fresh,
                cli.verbose,
            )
        }
        Commands::Dedup {
            db,
            export,
            keep,
            folder,
            across_folders,
            top,
        } => {
            let scope = DedupScope {
                folder: folder.as_deref().map(folder_key),
                across_folders,
                top,
            };
            run_dedup(&term, &db, export.as_deref(), keep.into(), &scope)
        }
        Commands::FolderSummary { db, export } => {
            run_folder_summary(&term, &db, export.as_deref())
        }
        Commands::FolderSimilar {
            db,
            threshold,
            min_files,
            export,
        } => {
            let options = SimilarityOptions::default()
                .threshold(threshold)
                .min_hashes(min_files);
            run_folder_similar(&term, &db, options, export.as_deref())
        }
        Commands::CompareFolders {
            folder1,
            folder2,
            db,
        } => run_compare_folders(&term, &db, &folder_key(&folder1), &folder_key(&folder2)),
        Commands::List { db, kind, limit } => run_list(&term, &db, kind.media_kind(), limit),
        Commands::Report { db, json } => run_report(&term, &db, json),
        Commands::Vacuum { db } => run_vacuum(&term, &db),
    }
}

fn open_store(db: &DbArgs) -> Result<SqliteStore> {
    let store = SqliteStore::open_in_dir(&db.db_path)?;
    info!("Using database {}", store.path().display());
    Ok(store)
}

/// Folders from the command line followed by those in the folder list
fn collect_folders(folders: Vec<PathBuf>, folder_list: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut all = folders;

    if let Some(list) = folder_list {
        let contents = fs::read_to_string(list).map_err(|e| {
            DedupError::Config(format!("cannot read folder list {}: {}", list.display(), e))
        })?;
        all.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(PathBuf::from),
        );
    }

    if all.is_empty() {
        return Err(DedupError::Config(
            "no folders to scan (pass folders or --folder-list)".to_string(),
        ));
    }
    Ok(all)
}

fn run_scan(
    term: &Term,
    folders: Vec<PathBuf>,
    folder_list: Option<&Path>,
    db: &DbArgs,
    config: ScanConfig,
    fresh: bool,
    verbose: bool,
) -> Result<()> {
    let folders = collect_folders(folders, folder_list)?;
    let store = open_store(db)?;

    if fresh {
        store.clear()?;
        info!("Cleared the index");
    }

    let (sender, receiver) = EventChannel::new();

    // The console log already narrates every step when verbose
    let progress = if verbose {
        None
    } else {
        let pb = ProgressBar::new(0);
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(bar_style);
        Some(pb)
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Scan(ScanEvent::Started { root }) => {
                    pb.set_length(0);
                    pb.set_position(0);
                    pb.set_message(format!("Walking {}", root.display()));
                }
                Event::Hash(HashEvent::PassStarted { kind, total }) => {
                    pb.set_length(total as u64);
                    pb.set_position(0);
                    pb.set_message(format!("Hashing {}s", kind));
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Hash(HashEvent::Failed { path, message }) => {
                    pb.println(format!(
                        "{} {}: {}",
                        style("!").yellow(),
                        path.display(),
                        message
                    ));
                }
                _ => {}
            }
        }
    });

    let summary = Scanner::new(&store, config)
        .with_events(sender)
        .scan_many(&folders);

    // Dropping the scanner dropped the sender, which ends the event thread
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    print_scan_summary(term, &summary);
    Ok(())
}

fn print_scan_summary(term: &Term, summary: &ScanSummary) {
    term.write_line("").ok();
    for outcome in &summary.folders {
        match &outcome.result {
            Ok(stats) => {
                term.write_line(&format!(
                    "{} {}",
                    style("✓").green().bold(),
                    outcome.folder.display()
                ))
                .ok();
                for line in stats.to_string().lines() {
                    term.write_line(&format!("    {}", line)).ok();
                }
            }
            Err(e) => {
                warn!("{}", e);
                term.write_line(&format!(
                    "{} {}: {}",
                    style("✗").red().bold(),
                    outcome.folder.display(),
                    e
                ))
                .ok();
            }
        }
    }

    if summary.folders.len() > 1 {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Total").bold().underlined()))
            .ok();
        for line in summary.total.to_string().lines() {
            term.write_line(&format!("    {}", line)).ok();
        }
    }
}

fn run_dedup(
    term: &Term,
    db: &DbArgs,
    export: Option<&Path>,
    policy: KeepPolicy,
    scope: &DedupScope,
) -> Result<()> {
    let store = open_store(db)?;
    let engine = DedupEngine::new(&store);

    let reports: Vec<DuplicateReport> = scope
        .groups(&engine)
        .into_iter()
        .filter_map(|group| DuplicateReport::from_group(group, policy))
        .collect();
    for kind in MediaKind::INDEXED {
        let kind_reports: Vec<_> = reports
            .iter()
            .filter(|r| r.group.kind == kind)
            .cloned()
            .collect();
        print_duplicates(term, kind, &kind_reports);
    }

    if let Some(path) = export {
        export_to_file(path, |file| export_duplicates_csv(&reports, file))?;
        term.write_line(&format!(
            "Exported duplicates to {}",
            style(path.display()).cyan()
        ))
        .ok();
    }

    term.write_line(&format!(
        "{}",
        style("Remember: no files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
    Ok(())
}

fn print_duplicates(term: &Term, kind: MediaKind, reports: &[DuplicateReport]) {
    let copies: usize = reports.iter().map(|r| r.duplicates.len()).sum();
    let wasted: u64 = reports.iter().map(|r| r.group.wasted_bytes).sum();

    term.write_line(&format!(
        "{} {} duplicate groups, {} extra copies, {} wasted",
        style(format!("{}s:", capitalize(kind.as_str()))).bold(),
        style(reports.len()).cyan(),
        style(copies).cyan(),
        style(human_size(wasted)).yellow()
    ))
    .ok();

    for report in reports {
        term.write_line(&format!(
            "  {} {}",
            style("Hash").dim(),
            style(&report.group.hash).dim()
        ))
        .ok();
        term.write_line(&format!(
            "    {} {} ({})",
            style("KEEP").green().bold(),
            report.master.path,
            human_size(report.master.size)
        ))
        .ok();
        for duplicate in &report.duplicates {
            term.write_line(&format!(
                "    {}  {} ({})",
                style("DUP").yellow(),
                duplicate.path,
                human_size(duplicate.size)
            ))
            .ok();
        }
    }
    term.write_line("").ok();
}

fn run_folder_summary(term: &Term, db: &DbArgs, export: Option<&Path>) -> Result<()> {
    let store = open_store(db)?;
    let folders = DedupEngine::new(&store).folder_stats();

    if folders.is_empty() {
        term.write_line("No folders indexed yet.").ok();
    }

    print_folder_table(term, &folders);

    if let Some(path) = export {
        export_to_file(path, |file| export_folder_summary_csv(&folders, file))?;
        term.write_line(&format!(
            "Exported folder summary to {}",
            style(path.display()).cyan()
        ))
        .ok();
    }
    Ok(())
}

fn print_folder_table(term: &Term, folders: &BTreeMap<String, FolderStats>) {
    let width = folders.keys().map(|f| f.len()).max().unwrap_or(0);
    for (folder, stats) in folders {
        term.write_line(&format!(
            "{:width$}  | Photos: {:5}  Dups: {:5}  Lost: {:>9}  | Videos: {:5}  Dups: {:5}  Lost: {:>9}",
            folder,
            stats.photos.count,
            stats.photos.duplicate_count,
            human_size(stats.photos.duplicate_bytes),
            stats.videos.count,
            stats.videos.duplicate_count,
            human_size(stats.videos.duplicate_bytes),
            width = width
        ))
        .ok();
    }
}

fn run_folder_similar(
    term: &Term,
    db: &DbArgs,
    options: SimilarityOptions,
    export: Option<&Path>,
) -> Result<()> {
    options.validate()?;
    let store = open_store(db)?;
    let pairs = DedupEngine::new(&store).folder_similarity(options)?;

    if pairs.is_empty() {
        term.write_line(&format!(
            "No folder pairs with similarity >= {:.2}",
            options.threshold
        ))
        .ok();
    }

    for pair in &pairs {
        term.write_line(&format!(
            "{} {}  <->  {}  ({} shared of {})",
            style(format!("{:>6.1}%", pair.similarity * 100.0)).cyan(),
            pair.folder1,
            pair.folder2,
            pair.intersection,
            pair.union
        ))
        .ok();
    }

    if let Some(path) = export {
        export_to_file(path, |file| export_similarity_csv(&pairs, file))?;
        term.write_line(&format!(
            "Exported similar folders to {}",
            style(path.display()).cyan()
        ))
        .ok();
    }
    Ok(())
}

fn run_compare_folders(term: &Term, db: &DbArgs, folder1: &str, folder2: &str) -> Result<()> {
    let store = open_store(db)?;
    let cmp = DedupEngine::new(&store).compare_folders(folder1, folder2);

    term.write_line(&format!("{}", style("Folder comparison").bold().cyan()))
        .ok();
    term.write_line(&format!("  1: {} ({} files)", cmp.folder1, cmp.folder1_total))
        .ok();
    term.write_line(&format!("  2: {} ({} files)", cmp.folder2, cmp.folder2_total))
        .ok();
    term.write_line(&format!("  Shared:       {}", style(cmp.shared).green()))
        .ok();
    term.write_line(&format!("  Only in 1:    {}", cmp.unique_to_folder1))
        .ok();
    term.write_line(&format!("  Only in 2:    {}", cmp.unique_to_folder2))
        .ok();
    term.write_line(&format!(
        "  Similarity:   {}",
        style(format!("{:.1}%", cmp.similarity * 100.0)).cyan()
    ))
    .ok();
    Ok(())
}

fn run_list(term: &Term, db: &DbArgs, kind: Option<MediaKind>, limit: Option<usize>) -> Result<()> {
    let store = open_store(db)?;
    let records = DedupEngine::new(&store).list(kind, limit);

    for record in &records {
        term.write_line(&format!(
            "{:6} | {:5} | {:>10} | {}",
            record.id,
            record.kind.as_str(),
            human_size(record.size),
            record.path
        ))
        .ok();
    }
    term.write_line(&format!("{} records", records.len())).ok();
    Ok(())
}

fn run_report(term: &Term, db: &DbArgs, json: bool) -> Result<()> {
    let store = open_store(db)?;
    let engine = DedupEngine::new(&store);
    let report = LibraryReport::build(&engine, store.path().to_path_buf(), store.database_size());

    if json {
        let output = serde_json::to_string_pretty(&report)
            .map_err(|e| DedupError::Config(format!("cannot serialise report: {e}")))?;
        term.write_line(&output).ok();
        return Ok(());
    }

    term.write_line(&format!("{}", style("Library Report").bold().cyan()))
        .ok();
    term.write_line(&format!(
        "  Database: {} ({})",
        report.database.display(),
        human_size(report.database_size)
    ))
    .ok();
    term.write_line("").ok();

    for (label, totals) in [("Photos", report.stats.photos), ("Videos", report.stats.videos)] {
        term.write_line(&format!("{}", style(label).bold().underlined()))
            .ok();
        term.write_line(&format!("  Files:            {}", totals.files))
            .ok();
        term.write_line(&format!("  Total size:       {}", human_size(totals.total_size)))
            .ok();
        term.write_line(&format!("  Duplicate groups: {}", totals.duplicate_groups))
            .ok();
        term.write_line(&format!(
            "  Wasted space:     {}",
            style(human_size(totals.wasted_bytes)).yellow()
        ))
        .ok();
        term.write_line("").ok();
    }

    let extra = report.duplicates.total();
    term.write_line(&format!(
        "{} extra copies in {} groups ({} photos, {} videos)",
        style(extra.files).cyan(),
        extra.groups,
        report.duplicates.photos.files,
        report.duplicates.videos.files
    ))
    .ok();
    term.write_line("").ok();

    if report.folders.is_empty() {
        term.write_line("No folders found in database.").ok();
    } else {
        term.write_line(&format!("{}", style("Per-folder statistics").bold().underlined()))
            .ok();
        print_folder_table(term, &report.folders);
        term.write_line("").ok();
    }

    if !report.scans.is_empty() {
        term.write_line(&format!("{}", style("Scanned folders").bold().underlined()))
            .ok();
        for scan in &report.scans {
            term.write_line(&format!(
                "  {}  {:6} files  {}",
                scan.last_scan,
                scan.file_count,
                scan.directory.display()
            ))
            .ok();
        }
    }
    Ok(())
}

fn run_vacuum(term: &Term, db: &DbArgs) -> Result<()> {
    let path = db.db_path.join(DB_FILE_NAME);
    if !path.exists() {
        return Err(DedupError::Config(format!(
            "no database at {}",
            path.display()
        )));
    }

    let store = open_store(db)?;
    let before = store.database_size();
    store.vacuum()?;
    let after = store.database_size();

    term.write_line(&format!(
        "{} Compacted {}: {} -> {}",
        style("✓").green().bold(),
        path.display(),
        human_size(before),
        human_size(after)
    ))
    .ok();
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_flags_parse() {
        let cli = Cli::parse_from([
            "photo-dedup",
            "--no-file-log",
            "scan",
            "/a",
            "/b",
            "--batch",
            "50",
            "--fresh",
        ]);
        match cli.command {
            Commands::Scan {
                folders,
                batch,
                fresh,
                threads,
                ..
            } => {
                assert_eq!(folders.len(), 2);
                assert_eq!(batch, 50);
                assert_eq!(threads, DEFAULT_THREADS);
                assert!(fresh);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.no_file_log);
    }

    #[test]
    fn out_of_range_threads_and_batch_are_rejected() {
        for args in [
            ["photo-dedup", "scan", "/a", "--threads", "0"],
            ["photo-dedup", "scan", "/a", "--threads", "33"],
            ["photo-dedup", "scan", "/a", "--batch", "0"],
            ["photo-dedup", "scan", "/a", "--batch", "10001"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{args:?} should fail");
        }

        let cli = Cli::try_parse_from(["photo-dedup", "scan", "/a", "--threads", "32"]).unwrap();
        assert!(matches!(cli.command, Commands::Scan { threads: 32, .. }));
    }

    #[test]
    fn list_type_accepts_plural_and_singular_names() {
        let kind_of = |value: &str| match Cli::parse_from(["photo-dedup", "list", "--type", value])
            .command
        {
            Commands::List { kind, .. } => kind.media_kind(),
            other => panic!("unexpected command {other:?}"),
        };

        assert_eq!(kind_of("all"), None);
        assert_eq!(kind_of("photos"), Some(MediaKind::Photo));
        assert_eq!(kind_of("photo"), Some(MediaKind::Photo));
        assert_eq!(kind_of("videos"), Some(MediaKind::Video));
        assert_eq!(kind_of("video"), Some(MediaKind::Video));

        match Cli::parse_from(["photo-dedup", "list"]).command {
            Commands::List { kind, .. } => assert_eq!(kind, Kind::All),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn dedup_scope_flags_parse() {
        let cli = Cli::parse_from(["photo-dedup", "dedup", "--across-folders", "--top", "5"]);
        match cli.command {
            Commands::Dedup {
                across_folders,
                top,
                folder,
                ..
            } => {
                assert!(across_folders);
                assert_eq!(top, Some(5));
                assert!(folder.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from([
            "photo-dedup",
            "dedup",
            "--folder",
            "/a",
            "--across-folders"
        ])
        .is_err());
    }

    #[test]
    fn dedup_scope_selects_groups() {
        use media_dedup::core::hasher::hash_bytes;
        use media_dedup::core::store::{MediaDetails, NewFileRecord};

        let store = SqliteStore::open_in_memory().unwrap();
        let photo = |path: &str, content: &[u8]| NewFileRecord {
            path: PathBuf::from(path),
            size: content.len() as u64,
            hash: hash_bytes(content),
            details: MediaDetails::Photo(Default::default()),
        };
        store
            .insert_batch(
                MediaKind::Photo,
                &[
                    photo("/a/1.jpg", b"small"),
                    photo("/a/2.jpg", b"small"),
                    photo("/a/3.jpg", b"much larger"),
                    photo("/b/3.jpg", b"much larger"),
                ],
            )
            .unwrap();
        let engine = DedupEngine::new(&store);

        assert_eq!(DedupScope::default().groups(&engine).len(), 2);

        let inside = DedupScope {
            folder: Some("/a".to_string()),
            ..Default::default()
        };
        assert_eq!(inside.groups(&engine)[0].hash, hash_bytes(b"small").to_hex());

        let across = DedupScope {
            across_folders: true,
            ..Default::default()
        };
        assert_eq!(across.groups(&engine)[0].hash, hash_bytes(b"much larger").to_hex());

        let top = DedupScope {
            top: Some(1),
            ..Default::default()
        };
        let largest = top.groups(&engine);
        assert_eq!(largest.len(), 1);
        assert_eq!(largest[0].wasted_bytes, 11);
    }

    #[test]
    fn compare_folders_takes_two_paths() {
        let cli = Cli::parse_from(["photo-dedup", "compare-folders", "/x", "/y", "--db-path", "/db"]);
        assert_eq!(cli.command.db_path(), Path::new("/db"));
        assert!(matches!(cli.command, Commands::CompareFolders { .. }));
    }

    #[test]
    fn folder_key_canonicalizes_existing_folders() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();

        let expected = fs::canonicalize(&nested).unwrap();
        assert_eq!(folder_key(&nested.join("..").join("nested")), expected.to_string_lossy());
        assert_eq!(folder_key(Path::new("/no/such/folder")), "/no/such/folder");
    }

    #[test]
    fn folder_list_skips_blank_and_comment_lines() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("folders.txt");
        fs::write(&list, "/photos\n\n# old drive\n  /videos  \n").unwrap();

        let folders = collect_folders(vec![PathBuf::from("/first")], Some(&list)).unwrap();
        assert_eq!(
            folders,
            vec![
                PathBuf::from("/first"),
                PathBuf::from("/photos"),
                PathBuf::from("/videos")
            ]
        );
    }

    #[test]
    fn no_folders_is_a_config_error() {
        assert!(matches!(
            collect_folders(Vec::new(), None),
            Err(DedupError::Config(_))
        ));
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("photo"), "Photo");
        assert_eq!(capitalize(""), "");
    }
}
