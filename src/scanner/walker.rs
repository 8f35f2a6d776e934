//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting `(path, size)` pairs for duplicate detection.
//!
//! # Features
//!
//! - Recursive traversal with children visited in file-name order
//! - Symbolic links are never followed, and symlink entries are skipped
//! - Case-sensitive extension filtering
//! - Per-entry errors are yielded, not fatal
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupsort::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Documents"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{FileEntry, TraversalError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback, ticked once per emitted file
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check if a file passes the extension filter.
    fn passes_extension_filter(&self, path: &Path) -> bool {
        match self.config.extension.as_deref() {
            None | Some("") => true,
            Some(wanted) => path.extension().and_then(|e| e.to_str()) == Some(wanted),
        }
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`TraversalError`] values rather than stopping
    /// iteration; the caller decides whether an error is fatal.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, TraversalError>> + '_ {
        let mut emitted = 0usize;

        WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| {
                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(self.handle_walkdir_error(e))),
                };

                let file_type = entry.file_type();
                if file_type.is_dir() {
                    return None;
                }
                if file_type.is_symlink() {
                    log::trace!("Skipping symlink: {}", entry.path().display());
                    return None;
                }
                if !file_type.is_file() {
                    log::trace!("Skipping special file: {}", entry.path().display());
                    return None;
                }
                if !self.passes_extension_filter(entry.path()) {
                    log::trace!(
                        "Skipping file due to extension filter: {}",
                        entry.path().display()
                    );
                    return None;
                }

                let metadata = match entry.metadata() {
                    Ok(m) => m,
                    Err(e) => return Some(Err(self.handle_walkdir_error(e))),
                };

                emitted += 1;
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(emitted, entry.path().to_string_lossy().as_ref());
                }

                Some(Ok(FileEntry::new(entry.into_path(), metadata.len())))
            })
    }

    /// Convert a walkdir error into a [`TraversalError`].
    fn handle_walkdir_error(&self, error: walkdir::Error) -> TraversalError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        let err = match error.into_io_error() {
            Some(io_error) => TraversalError::from_io(&path, io_error),
            None => TraversalError::from_io(
                &path,
                std::io::Error::other("filesystem loop detected"),
            ),
        };

        match err {
            TraversalError::NotFound(_) => {
                log::debug!("Path vanished during walk: {}", path.display());
            }
            _ => log::warn!("{}", err),
        }
        err
    }
}
