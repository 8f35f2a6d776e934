//! Size grouping and confirmed duplicate sets.
//!
//! # Overview
//!
//! Size grouping is the first phase of duplicate detection. Files with
//! different sizes cannot be duplicates, so every file whose size is unique is
//! eliminated here without any I/O.
//!
//! Grouping is order-preserving: buckets come back in the order their size was
//! first seen, and members keep the order in which the walker emitted them.
//! Later phases rely on this to make results reproducible across runs.
//!
//! # Example
//!
//! ```
//! use dupsort::scanner::FileEntry;
//! use dupsort::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].size, 1024);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in emission order
    pub files: Vec<FileEntry>,
}

impl SizeGroup {
    /// Create an empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileEntry>) -> Self {
        Self { size, files }
    }

    /// Add a file to this group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match group size.
    pub fn add(&mut self, file: FileEntry) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match group size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Potential space savings (all copies minus one).
    #[must_use]
    pub fn potential_savings(&self) -> u64 {
        self.size * (self.files.len() as u64).saturating_sub(1)
    }
}

/// A confirmed set of two or more byte-identical files.
///
/// Every member has the same size and the same content digest. The first
/// member is the one a prune keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    digest: Hash,
    size: u64,
    files: Vec<FileEntry>,
}

impl DuplicateSet {
    /// Create a new duplicate set.
    #[must_use]
    pub fn new(digest: Hash, size: u64, files: Vec<FileEntry>) -> Self {
        debug_assert!(
            files.iter().all(|f| f.size == size),
            "all members of a duplicate set share one size"
        );
        Self {
            digest,
            size,
            files,
        }
    }

    /// BLAKE3 digest shared by every member.
    #[must_use]
    pub fn digest(&self) -> &Hash {
        &self.digest
    }

    /// Digest as a 64-character lowercase hex string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Size in bytes of each member.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Members in within-set order.
    #[must_use]
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Take ownership of the members.
    #[must_use]
    pub fn into_files(self) -> Vec<FileEntry> {
        self.files
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Member paths in within-set order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Number of redundant copies (members minus one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes reclaimable by keeping only one copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// The member a prune keeps.
    #[must_use]
    pub fn retained(&self) -> Option<&FileEntry> {
        self.files.first()
    }

    /// The members a prune removes.
    #[must_use]
    pub fn removable(&self) -> &[FileEntry] {
        self.files.get(1..).unwrap_or(&[])
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of zero-byte files left out of grouping
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (Phase 1 of duplicate detection).
///
/// Zero-byte files form an ordinary bucket. Use [`group_by_size_with`] to
/// leave them out.
///
/// # Returns
///
/// Buckets with 2+ files, in first-seen order of their size, plus the
/// grouping statistics.
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (Vec<SizeGroup>, GroupingStats) {
    group_by_size_with(files, false)
}

/// Group files by size, optionally skipping zero-byte files.
///
/// Skipped empty files are still counted in `total_files` and reported in
/// `empty_files`.
#[must_use]
pub fn group_by_size_with(
    files: impl IntoIterator<Item = FileEntry>,
    skip_empty: bool,
) -> (Vec<SizeGroup>, GroupingStats) {
    let mut groups: Vec<SizeGroup> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;

        if skip_empty && file.size == 0 {
            stats.empty_files += 1;
            log::trace!("Skipping empty file: {}", file.path.display());
            continue;
        }

        match index.get(&file.size) {
            Some(&slot) => groups[slot].add(file),
            None => {
                index.insert(file.size, groups.len());
                groups.push(SizeGroup::with_files(file.size, vec![file]));
            }
        }
    }

    if stats.empty_files > 0 {
        log::info!("Skipped {} empty file(s)", stats.empty_files);
    }

    stats.unique_sizes = groups.len();

    groups.retain(|group| {
        if group.has_duplicates() {
            stats.potential_duplicates += group.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Size group {} bytes: {} potential duplicates",
                group.size,
                group.len()
            );
            true
        } else {
            stats.eliminated_unique += group.len();
            log::trace!(
                "Eliminated unique size {}: {}",
                group.size,
                group.files[0].path.display()
            );
            false
        }
    });

    log::info!(
        "Phase 1 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}
