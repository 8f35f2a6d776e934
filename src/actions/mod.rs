//! File actions module.
//!
//! This module provides functionality for:
//! - Permanent deletion (default) or move to system trash
//! - Size verification before each deletion
//! - Keep-first pruning of duplicate sets
//!
//! ```no_run
//! use dupsort::actions::{prune_sets, DeleteConfig};
//! use dupsort::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let (sets, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! let report = prune_sets(&sets, &DeleteConfig::trash());
//! println!("{}", report.summary());
//! ```

pub mod delete;
pub mod prune;

pub use delete::{
    delete_batch, delete_to_trash, delete_verified, permanent_delete, validate_preserves_copy,
    BatchDeleteResult, DeleteConfig, DeleteResult, DeletionError, FileSnapshot,
};
pub use prune::{plan_prune, prune_sets, PruneOutcome, PruneReport};
