//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Whole-file content hashing and digest grouping (Phase 2)
//! - Ordering of sets and members
//! - Pipeline orchestration

pub mod finder;
pub mod groups;
pub mod ordering;

pub use finder::{
    resolve_duplicates, DuplicateFinder, FinderConfig, FinderError, HashStats, ResolveConfig,
    ScanSummary, DEFAULT_IO_THREADS,
};
pub use groups::{group_by_size, group_by_size_with, DuplicateSet, GroupingStats, SizeGroup};
pub use ordering::{MemberOrder, OrderingPolicy, SortDirection};
