//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Sorted, single-threaded directory walking using walkdir
//! - Extension filtering (case-sensitive)
//! - Whole-file content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupsort::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! // Only look at .txt files
//! let config = WalkerConfig::default().with_extension(Some("txt".to_string()));
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use hasher::{hash_to_hex, hex_to_hash, Hash, Hasher, DEFAULT_BUFFER_SIZE};
pub use walker::Walker;

/// A regular file discovered by the walker.
///
/// The path is the file's identity for the whole run: no two entries
/// produced by one walk share a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Only yield files with this extension (compared case-sensitively,
    /// without the leading dot). `None` or an empty string yields all files.
    pub extension: Option<String>,
}

impl WalkerConfig {
    /// Set the extension filter.
    ///
    /// A leading `.` is stripped, so `"txt"` and `".txt"` are equivalent.
    #[must_use]
    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty());
        self
    }
}

/// Errors that can occur while walking the directory tree.
#[derive(thiserror::Error, Debug, Clone)]
pub enum TraversalError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path vanished while the walk was in progress.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Any other I/O error while reading a directory or stat'ing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl TraversalError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::Io { path: p, .. } => p,
        }
    }
}

/// Why a file could not be hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashErrorReason {
    /// The file disappeared before or while it was read.
    NotFound,
    /// The file could not be opened for reading.
    PermissionDenied,
    /// A read failed mid-stream.
    Io,
    /// Hashing stopped because shutdown was requested.
    Interrupted,
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Hashing was abandoned because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Io { path: p, .. }
            | Self::Interrupted(p) => p,
        }
    }

    /// The failure category.
    #[must_use]
    pub fn reason(&self) -> HashErrorReason {
        match self {
            Self::NotFound(_) => HashErrorReason::NotFound,
            Self::PermissionDenied(_) => HashErrorReason::PermissionDenied,
            Self::Io { .. } => HashErrorReason::Io,
            Self::Interrupted(_) => HashErrorReason::Interrupted,
        }
    }
}

/// An entry-level failure that removed one path from consideration.
///
/// These are surfaced as warnings in non-strict mode.
#[derive(thiserror::Error, Debug, Clone)]
pub enum EntryError {
    /// The entry could not be enumerated or stat'ed.
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    /// The entry could not be hashed or compared.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl EntryError {
    /// Path of the skipped entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Traversal(e) => e.path(),
            Self::Hash(e) => e.path(),
        }
    }

    /// Short description of the failure, without the path.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Traversal(TraversalError::PermissionDenied(_))
            | Self::Hash(HashError::PermissionDenied(_)) => "permission denied".to_string(),
            Self::Traversal(TraversalError::NotFound(_)) | Self::Hash(HashError::NotFound(_)) => {
                "not found".to_string()
            }
            Self::Traversal(TraversalError::Io { source, .. })
            | Self::Hash(HashError::Io { source, .. }) => source.to_string(),
            Self::Hash(HashError::Interrupted(_)) => "interrupted".to_string(),
        }
    }
}
