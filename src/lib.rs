//! # Media Dedup
//!
//! Indexes photo and video libraries by content hash, then reports exact
//! duplicates and folders that hold the same files.
//!
//! ## Core Philosophy
//! - **Never touch the media** - files are only read, nothing is moved or deleted
//! - **Exact only** - two files are duplicates when their bytes are identical
//! - **Incremental** - a rescan only hashes paths that are not indexed yet
//!
//! ## Architecture
//! - `core` - classifier, hasher, scanner, store, comparator and reporter
//! - `events` - progress events for whichever front-end is listening
//! - `error` - error types per failure layer
//!
//! The library logs through `tracing` and never installs a subscriber
//! itself; the binary calls [`init_tracing`] once at start-up.

pub mod core;
pub mod error;
pub mod events;

pub use error::{DedupError, Result};

use chrono::Local;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Where log output goes
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Console shows debug messages instead of info
    pub verbose: bool,
    /// Explicit log file (None = timestamped file in the default directory)
    pub log_file: Option<PathBuf>,
    /// Write a log file at all
    pub file_logging: bool,
}

impl LogConfig {
    /// `photo_dedup_YYYYmmdd_HHMMSS.log` inside `dir`
    pub fn default_log_file(dir: &Path) -> PathBuf {
        dir.join(format!(
            "photo_dedup_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    }
}

/// `[HH:MM:SS]` wall clock timestamps for the console
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", Local::now().format("%H:%M:%S"))
    }
}

/// Initialize tracing for the application.
///
/// Console output honours `RUST_LOG` and defaults to `info` (`debug` when
/// verbose). The file, if enabled, always records debug output. Returns
/// the path of the log file that was opened.
pub fn init_tracing(config: &LogConfig, default_dir: &Path) -> Result<Option<PathBuf>> {
    let default_level = if config.verbose { "debug" } else { "info" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_level(false)
        .with_timer(ClockTime)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file_layer, log_path) = if config.file_logging {
        let path = config
            .log_file
            .clone()
            .unwrap_or_else(|| LogConfig::default_log_file(default_dir));
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DedupError::Config(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let file = File::create(&path).map_err(|e| {
            DedupError::Config(format!("cannot create log file {}: {}", path.display(), e))
        })?;

        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
            .with_filter(LevelFilter::DEBUG);
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| DedupError::Config(format!("logging already initialised: {e}")))?;

    Ok(log_path)
}
