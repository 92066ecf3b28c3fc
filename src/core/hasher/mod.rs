//! # Hasher Module
//!
//! Computes exact content digests for media files.
//!
//! ## How It Works
//! 1. Pick a read buffer size from the file size (or use a fixed one)
//! 2. Stream the file through an XXH3-128 accumulator chunk by chunk
//! 3. Return the 128-bit digest
//!
//! Identical bytes always give the same digest, whatever the path,
//! modification time or buffer size. Duplicate detection relies on it.
//!
//! ## Example
//! ```rust,ignore
//! use media_dedup::core::hasher::ContentHasher;
//!
//! let hasher = ContentHasher::new();
//! let digest = hasher.hash_file(&path)?;
//! println!("{}", digest);
//! ```

mod digest;

pub use digest::{ContentDigest, ParseDigestError};

use crate::error::HashError;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use xxhash_rust::xxh3::{xxh3_128, Xxh3};

/// Default read buffer (256 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// How the hasher sizes its read buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BufferPolicy {
    /// Scale the buffer with the file size
    #[default]
    Adaptive,
    /// Always use this many bytes (values of 0 are treated as 1)
    Fixed(usize),
}

/// Buffer size for a file of the given length.
///
/// Small buffers for tiny files, 1 MiB for files of 100 MiB and up.
pub fn optimal_buffer_size(file_size: u64) -> usize {
    if file_size < KIB {
        1024
    } else if file_size < MIB {
        8 * 1024
    } else if file_size < 100 * MIB {
        DEFAULT_BUFFER_SIZE
    } else {
        1024 * 1024
    }
}

/// Streaming XXH3-128 file hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher {
    policy: BufferPolicy,
}

impl ContentHasher {
    /// Hasher with an adaptive buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher that always reads `buffer_size` bytes at a time
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            policy: BufferPolicy::Fixed(buffer_size),
        }
    }

    pub fn policy(&self) -> BufferPolicy {
        self.policy
    }

    /// Hash a file's full content.
    ///
    /// Fails if the file is missing (including files removed after
    /// discovery), is not a regular file, or cannot be read.
    pub fn hash_file(&self, path: &Path) -> Result<ContentDigest, HashError> {
        let metadata =
            fs::metadata(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        if !metadata.is_file() {
            return Err(HashError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let buffer_size = match self.policy {
            BufferPolicy::Adaptive => optimal_buffer_size(metadata.len()),
            BufferPolicy::Fixed(size) => size.max(1),
        };

        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        hash_reader(file, buffer_size).map_err(|e| HashError::from_io(path.to_path_buf(), e))
    }
}

/// Hash everything a reader yields, `buffer_size` bytes at a time
pub fn hash_reader<R: Read>(mut reader: R, buffer_size: usize) -> io::Result<ContentDigest> {
    let mut state = Xxh3::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => state.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(ContentDigest::new(state.digest128()))
}

/// Hash an in-memory byte slice
pub fn hash_bytes(data: &[u8]) -> ContentDigest {
    ContentDigest::new(xxh3_128(data))
}

/// Check a file against a previously recorded hex digest (case-insensitive)
pub fn verify_file(path: &Path, expected_hex: &str) -> Result<bool, HashError> {
    let actual = ContentHasher::new().hash_file(path)?;
    Ok(actual.to_hex().eq_ignore_ascii_case(expected_hex))
}

/// Whether two files have identical content.
///
/// Sizes are compared first so differently sized files are never read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, HashError> {
    let size_a = fs::metadata(a)
        .map_err(|e| HashError::from_io(a.to_path_buf(), e))?
        .len();
    let size_b = fs::metadata(b)
        .map_err(|e| HashError::from_io(b.to_path_buf(), e))?
        .len();
    if size_a != size_b {
        return Ok(false);
    }

    let hasher = ContentHasher::new();
    Ok(hasher.hash_file(a)? == hasher.hash_file(b)?)
}
