//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - Collect every regular file under the root
//! 2. **Phase 1 - Size grouping**: Group files by size (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Content hashing**: Hash the whole content of every file in a
//!    multi-member size group and group by digest
//! 4. **Ordering**: Apply the configured [`OrderingPolicy`]
//!
//! # Example
//!
//! ```no_run
//! use dupsort::scanner::{Walker, WalkerConfig, FileEntry, Hasher};
//! use dupsort::duplicates::{group_by_size, resolve_duplicates, ResolveConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<FileEntry> = walker.walk().filter_map(Result::ok).collect();
//! let (size_groups, _) = group_by_size(files);
//!
//! let (sets, stats) = resolve_duplicates(size_groups, &Hasher::new(), &ResolveConfig::default());
//! println!("{} sets, {} bytes hashed", sets.len(), stats.bytes_hashed);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{group_by_size_with, DuplicateSet, SizeGroup};
use super::ordering::OrderingPolicy;
use crate::progress::ProgressCallback;
use crate::scanner::{
    EntryError, FileEntry, Hash, HashError, Hasher, TraversalError, Walker, WalkerConfig,
};

/// Files larger than this are logged individually when hashed.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

// ============================================================================
// Phase 2 - Content hashing
// ============================================================================

/// Configuration for the content hashing phase.
#[derive(Clone)]
pub struct ResolveConfig {
    /// Number of worker threads hashing in parallel.
    pub io_threads: usize,
    /// Confirm digest matches byte for byte.
    pub paranoid: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ResolveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveConfig")
            .field("io_threads", &self.io_threads)
            .field("paranoid", &self.paranoid)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            paranoid: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl ResolveConfig {
    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable byte-for-byte verification of digest matches.
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set the shutdown flag for graceful termination.
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
}

/// Statistics from the content hashing phase.
#[derive(Debug, Clone, Default)]
pub struct HashStats {
    /// Files submitted for hashing
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files that could not be hashed or compared
    pub failed_files: usize,
    /// Total bytes read while hashing
    pub bytes_hashed: u64,
    /// Every hashing or comparison failure, in bucket order
    pub errors: Vec<HashError>,
    /// Extra sets produced when byte verification split a digest group
    pub verification_splits: usize,
    /// Confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Redundant copies across all sets
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per set
    pub wasted_space: u64,
    /// Whether shutdown was requested during the phase
    pub interrupted: bool,
}

impl HashStats {
    fn record_failure(&mut self, error: HashError) {
        if matches!(error, HashError::Interrupted(_)) {
            self.interrupted = true;
            return;
        }
        log::warn!("Skipping {}: {}", error.path().display(), error);
        self.failed_files += 1;
        self.errors.push(error);
    }
}

/// Hash every member of every size group and build duplicate sets (Phase 2).
///
/// Hashing runs on a dedicated rayon pool of `io_threads` workers. Each file's
/// result lands in its own slot, so grouping afterwards sees the files in
/// bucket order no matter which worker finished first.
///
/// A file that fails to hash is recorded in [`HashStats::errors`] and left
/// out; the rest of its bucket is still grouped. If shutdown is requested the
/// returned set list is empty and [`HashStats::interrupted`] is true.
#[must_use]
pub fn resolve_duplicates(
    size_groups: Vec<SizeGroup>,
    hasher: &Hasher,
    config: &ResolveConfig,
) -> (Vec<DuplicateSet>, HashStats) {
    let jobs: Vec<&FileEntry> = size_groups.iter().flat_map(|g| g.files.iter()).collect();
    let mut stats = HashStats {
        input_files: jobs.len(),
        ..Default::default()
    };

    if jobs.is_empty() {
        log::debug!("Phase 2: No files to hash");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", jobs.len());
    }

    log::info!(
        "Phase 2: Hashing {} files in {} size groups",
        jobs.len(),
        size_groups.len()
    );

    let completed = AtomicUsize::new(0);
    let hash_one = |file: &&FileEntry| -> Option<Result<Hash, HashError>> {
        if config.is_shutdown_requested() {
            return None;
        }

        if file.size > LARGE_FILE_THRESHOLD {
            log::debug!(
                "Hashing large file ({}): {}",
                ByteSize(file.size),
                file.path.display()
            );
        }

        let result = hasher.full_hash(&file.path);
        if result.is_ok() {
            log::trace!("Hashed: {}", file.path.display());
        }

        if let Some(ref callback) = config.progress_callback {
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            callback.on_progress(done, file.path.to_string_lossy().as_ref());
            callback.on_item_completed(file.size);
        }
        Some(result)
    };

    let results: Vec<Option<Result<Hash, HashError>>> =
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.io_threads.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| jobs.par_iter().map(&hash_one).collect()),
            Err(e) => {
                log::warn!(
                    "Failed to create hashing thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                jobs.par_iter().map(&hash_one).collect()
            }
        };
    drop(jobs);

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Phase 2: Interrupted by shutdown signal");
        return (Vec::new(), stats);
    }

    let mut results = results.into_iter();
    let mut sets = Vec::new();

    for group in size_groups {
        let mut digest_groups: Vec<(Hash, Vec<FileEntry>)> = Vec::new();
        let mut index: HashMap<Hash, usize> = HashMap::new();

        for file in group.files {
            match results.next().flatten() {
                None => stats.interrupted = true,
                Some(Ok(digest)) => {
                    stats.hashed_files += 1;
                    stats.bytes_hashed += file.size;
                    match index.get(&digest) {
                        Some(&slot) => digest_groups[slot].1.push(file),
                        None => {
                            index.insert(digest, digest_groups.len());
                            digest_groups.push((digest, vec![file]));
                        }
                    }
                }
                Some(Err(e)) => stats.record_failure(e),
            }
        }

        for (digest, files) in digest_groups {
            if files.len() < 2 {
                continue;
            }
            if config.paranoid {
                sets.extend(verify_identical(digest, group.size, files, hasher, &mut stats));
            } else {
                sets.push(DuplicateSet::new(digest, group.size, files));
            }
        }
    }

    if stats.interrupted {
        log::info!("Phase 2: Interrupted by shutdown signal");
        return (Vec::new(), stats);
    }

    for set in &sets {
        log::debug!(
            "Duplicate set {}: {} files, {} bytes each",
            set.digest_hex(),
            set.len(),
            set.size()
        );
    }

    stats.duplicate_sets = sets.len();
    stats.duplicate_files = sets.iter().map(DuplicateSet::duplicate_count).sum();
    stats.wasted_space = sets.iter().map(DuplicateSet::wasted_space).sum();

    log::info!(
        "Phase 2 complete: {} sets, {} duplicates, {} reclaimable",
        stats.duplicate_sets,
        stats.duplicate_files,
        ByteSize(stats.wasted_space)
    );

    (sets, stats)
}

/// Split one digest group into byte-identical partitions.
///
/// Each file is compared against the first member of each existing
/// partition. Partitions with fewer than two members are discarded.
///
/// A failed comparison drops whichever side failed. When the failing side is
/// a partition's first member, the next member takes its place and the
/// comparison is retried.
fn verify_identical(
    digest: Hash,
    size: u64,
    files: Vec<FileEntry>,
    hasher: &Hasher,
    stats: &mut HashStats,
) -> Vec<DuplicateSet> {
    let mut partitions: Vec<Vec<FileEntry>> = Vec::new();

    'files: for file in files {
        let mut slot = 0;
        while slot < partitions.len() {
            let representative = &partitions[slot][0].path;
            match hasher.files_identical(representative, &file.path) {
                Ok(true) => {
                    partitions[slot].push(file);
                    continue 'files;
                }
                Ok(false) => slot += 1,
                Err(e @ HashError::Interrupted(_)) => {
                    stats.record_failure(e);
                    continue 'files;
                }
                Err(e) if e.path() == representative.as_path() => {
                    stats.record_failure(e);
                    partitions[slot].remove(0);
                    if partitions[slot].is_empty() {
                        partitions.remove(slot);
                    }
                }
                Err(e) => {
                    stats.record_failure(e);
                    continue 'files;
                }
            }
        }
        partitions.push(vec![file]);
    }

    if partitions.len() > 1 {
        log::warn!(
            "Byte verification split digest {} into {} groups",
            crate::scanner::hash_to_hex(&digest),
            partitions.len()
        );
        stats.verification_splits += partitions.len() - 1;
    }

    partitions
        .into_iter()
        .filter(|p| p.len() > 1)
        .map(|p| DuplicateSet::new(digest, size, p))
        .collect()
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration (extension filter).
    pub walker_config: WalkerConfig,
    /// Abort on the first traversal or hash error.
    pub strict: bool,
    /// Confirm digest matches byte for byte.
    pub paranoid: bool,
    /// Leave zero-byte files out of grouping.
    pub skip_empty: bool,
    /// Number of hashing threads. Default is 4 to bound disk contention.
    pub io_threads: usize,
    /// Output ordering.
    pub ordering: OrderingPolicy,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("strict", &self.strict)
            .field("paranoid", &self.paranoid)
            .field("skip_empty", &self.skip_empty)
            .field("io_threads", &self.io_threads)
            .field("ordering", &self.ordering)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            strict: false,
            paranoid: false,
            skip_empty: false,
            io_threads: DEFAULT_IO_THREADS,
            ordering: OrderingPolicy::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set fail-fast on any entry error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable paranoid mode (byte-by-byte verification).
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Leave zero-byte files out of grouping.
    #[must_use]
    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the output ordering.
    #[must_use]
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    fn resolve_config(&self) -> ResolveConfig {
        ResolveConfig {
            io_threads: self.io_threads,
            paranoid: self.paranoid,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of zero-byte files left out (only with `skip_empty`)
    pub empty_files: usize,
    /// Total bytes read while hashing
    pub bytes_hashed: u64,
    /// Extra sets produced by byte verification
    pub verification_splits: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_groups: usize,
    /// Total number of redundant copies (excluding the kept member)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Entries skipped because of traversal or hashing errors
    pub warnings: Vec<EntryError>,
}

impl ScanSummary {
    /// Percentage of the scanned bytes that duplicates waste.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }

    /// Whether any entry was skipped.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Strict mode: an entry could not be enumerated.
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    /// Strict mode: a file could not be hashed or compared.
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupsort::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_io_threads(4);
/// let finder = DuplicateFinder::new(config);
///
/// let (sets, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate sets", sets.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under the given directory.
    ///
    /// # Returns
    ///
    /// Duplicate sets in [`OrderingPolicy`] order, plus summary statistics
    /// that include every skipped entry as a warning.
    ///
    /// # Errors
    ///
    /// - [`FinderError::PathNotFound`] / [`FinderError::NotADirectory`] for a bad root
    /// - [`FinderError::Interrupted`] if shutdown was requested
    /// - [`FinderError::Traversal`] / [`FinderError::Hash`] for the first
    ///   entry error in strict mode
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", path.display()));
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) if self.config.strict => return Err(FinderError::Traversal(e)),
                Err(e) => warnings.push(EntryError::from(e)),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Walk complete: {} files, {} unreadable entries",
            files.len(),
            warnings.len()
        );

        self.run_pipeline(files, warnings, start_time)
    }

    /// Find duplicates in a pre-collected list of files.
    ///
    /// # Errors
    ///
    /// Same as [`DuplicateFinder::find_duplicates`], minus the root and
    /// traversal errors.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        self.run_pipeline(files, Vec::new(), Instant::now())
    }

    fn run_pipeline(
        &self,
        files: Vec<FileEntry>,
        warnings: Vec<EntryError>,
        start_time: Instant,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let mut summary = ScanSummary {
            warnings,
            ..Default::default()
        };

        log::info!("Phase 1: Grouping by size...");
        let (size_groups, size_stats) = group_by_size_with(files, self.config.skip_empty);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;
        summary.empty_files = size_stats.empty_files;

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (sets, hash_stats) =
            resolve_duplicates(size_groups, &self.hasher, &self.config.resolve_config());

        if hash_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if self.config.strict {
            if let Some(first) = hash_stats.errors.into_iter().next() {
                return Err(FinderError::Hash(first));
            }
        } else {
            summary
                .warnings
                .extend(hash_stats.errors.into_iter().map(EntryError::from));
        }

        let sets = self.config.ordering.apply(sets);

        summary.bytes_hashed = hash_stats.bytes_hashed;
        summary.verification_splits = hash_stats.verification_splits;
        summary.duplicate_groups = hash_stats.duplicate_sets;
        summary.duplicate_files = hash_stats.duplicate_files;
        summary.reclaimable_space = hash_stats.wasted_space;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate sets, {} duplicate files, {} reclaimable, {} warning(s)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.warnings.len()
        );

        Ok((sets, summary))
    }
}
