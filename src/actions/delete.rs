//! File deletion with size verification.
//!
//! # Overview
//!
//! This module removes individual duplicate files:
//! - Permanent unlink (default)
//! - Move to system trash via the `trash` crate (recoverable)
//! - Batch operations that isolate each failure
//! - Size verification against the scanned snapshot before each deletion
//!
//! # Safety
//!
//! Every deletion first checks that the file still exists with the size the
//! scan saw. [`validate_preserves_copy`] guards that a batch never covers
//! every copy of a set.
//!
//! # Example
//!
//! ```no_run
//! use dupsort::actions::delete::{delete_verified, DeleteConfig, FileSnapshot};
//! use std::path::PathBuf;
//!
//! let snapshot = FileSnapshot::new(PathBuf::from("/path/to/duplicate.txt"), 1024);
//! match delete_verified(&snapshot, &DeleteConfig::default()) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scanner::FileEntry;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeletionError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since the scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File that could not be trashed
        path: PathBuf,
        /// Message from the trash backend
        message: String,
    },

    /// Unlink failed.
    #[error("remove failed for {path}: {message}")]
    RemoveFailed {
        /// File that could not be removed
        path: PathBuf,
        /// Message from the operating system
        message: String,
    },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeletionError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::TrashFailed { path: p, .. }
            | Self::RemoveFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Results of a batch deletion.
#[derive(Debug, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<(PathBuf, DeletionError)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Whether the batch stopped early on an error.
    pub stopped: bool,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Unlink permanently instead of moving to trash.
    pub permanent: bool,
    /// Compare the current size with the scanned size before deleting.
    pub verify_size: bool,
    /// Continue on error (process remaining files even if some fail).
    pub continue_on_error: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            permanent: true,
            verify_size: true,
            continue_on_error: true,
        }
    }
}

impl DeleteConfig {
    /// Config for moving files to the system trash.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            permanent: false,
            ..Self::default()
        }
    }

    /// Config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self::default()
    }

    /// Enable/disable size verification.
    #[must_use]
    pub fn with_verify_size(mut self, verify: bool) -> Self {
        self.verify_size = verify;
        self
    }

    /// Enable/disable continue on error.
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }
}

/// The state of a file as the scan saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes at scan time.
    pub size: u64,
}

impl FileSnapshot {
    /// Create a snapshot from known values.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }

    /// Snapshot of a scanned entry.
    #[must_use]
    pub fn from_entry(entry: &FileEntry) -> Self {
        Self::new(entry.path.clone(), entry.size)
    }

    /// Capture a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, DeletionError> {
        let metadata = fs::metadata(path).map_err(|e| DeletionError::from_io(path, e))?;
        Ok(Self::new(path.to_path_buf(), metadata.len()))
    }

    /// Verify that the file still matches this snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the file was resized, deleted, or can't be accessed.
    pub fn verify(&self) -> Result<(), DeletionError> {
        let current = Self::capture(&self.path)?;

        if self.size != current.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                self.path.display(),
                self.size,
                current.size
            );
            return Err(DeletionError::Modified(self.path.clone()));
        }

        Ok(())
    }
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` / `PermissionDenied` if the file can't be stat'ed
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeletionError> {
    let size = fs::metadata(path)
        .map_err(|e| DeletionError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeletionError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: false,
    })
}

/// Permanently delete a single file.
///
/// # Errors
///
/// - `NotFound` / `PermissionDenied` if the file can't be stat'ed
/// - `RemoveFailed` if the unlink fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeletionError> {
    let size = fs::metadata(path)
        .map_err(|e| DeletionError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Remove failed for {}: {}", path.display(), e);
        match e.kind() {
            io::ErrorKind::PermissionDenied => DeletionError::PermissionDenied(path.to_path_buf()),
            _ => DeletionError::RemoveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        }
    })?;

    log::info!("Deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: true,
    })
}

/// Delete a file after checking it still matches its snapshot.
///
/// # Errors
///
/// - `Modified` if the size changed since the scan
/// - Other errors from [`delete_to_trash`] or [`permanent_delete`]
pub fn delete_verified(
    snapshot: &FileSnapshot,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeletionError> {
    if config.verify_size {
        snapshot.verify()?;
    }

    if config.permanent {
        permanent_delete(&snapshot.path)
    } else {
        delete_to_trash(&snapshot.path)
    }
}

/// Delete multiple files, isolating each failure.
///
/// With `continue_on_error` unset the batch stops at the first failure and
/// sets [`BatchDeleteResult::stopped`].
#[must_use]
pub fn delete_batch(targets: &[FileSnapshot], config: &DeleteConfig) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for (index, target) in targets.iter().enumerate() {
        log::trace!(
            "Deleting {}/{}: {}",
            index + 1,
            targets.len(),
            target.path.display()
        );

        match delete_verified(target, config) {
            Ok(del) => {
                result.bytes_freed += del.size;
                result.successes.push(del);
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", target.path.display(), e);
                result.failures.push((target.path.clone(), e));

                if !config.continue_on_error {
                    log::info!("Stopping batch deletion due to error (continue_on_error=false)");
                    result.stopped = true;
                    break;
                }
            }
        }
    }

    result
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if no member of `group_paths` is left
/// out of `selected_paths`.
///
/// # Example
///
/// ```
/// use dupsort::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![PathBuf::from("/original.txt"), PathBuf::from("/copy.txt")];
///
/// assert!(validate_preserves_copy(&group[1..], &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeletionError> {
    let selected: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved = group_paths
        .iter()
        .filter(|p| !selected.contains(p))
        .count();

    if preserved == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate set",
            group_paths.len()
        );
        Err(DeletionError::AllCopiesWouldBeDeleted)
    } else {
        log::debug!(
            "Deletion validated: {} files selected, {} preserved",
            selected_paths.len(),
            preserved
        );
        Ok(())
    }
}
