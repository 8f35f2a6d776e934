//! Keep-first pruning of duplicate sets.
//!
//! For every set the first member (in within-set order) is kept and every
//! other member is deleted. Each deletion is isolated: a failure is recorded
//! against its path and the rest of the prune carries on.

use std::path::PathBuf;

use super::delete::{
    delete_batch, validate_preserves_copy, DeleteConfig, DeletionError, FileSnapshot,
};
use crate::duplicates::DuplicateSet;
use crate::scanner::FileEntry;

/// What happened to one duplicate set.
#[derive(Debug)]
pub struct PruneOutcome {
    /// Per-file size in bytes
    pub size: u64,
    /// Hex digest of the set
    pub hash: String,
    /// The member that was kept
    pub retained: PathBuf,
    /// Members that were removed (or would be, in a dry run)
    pub deleted: Vec<PathBuf>,
    /// Members that could not be removed
    pub failed: Vec<(PathBuf, DeletionError)>,
}

/// Result of pruning every set.
#[derive(Debug, Default)]
pub struct PruneReport {
    /// One outcome per set, in set order
    pub groups: Vec<PruneOutcome>,
    /// Bytes freed (or freeable, in a dry run)
    pub bytes_freed: u64,
    /// Whether nothing was actually deleted
    pub dry_run: bool,
    /// Whether the prune stopped early because `continue_on_error` was unset
    pub stopped: bool,
}

impl PruneReport {
    /// Number of files removed.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.groups.iter().map(|g| g.deleted.len()).sum()
    }

    /// Number of files that could not be removed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.groups.iter().map(|g| g.failed.len()).sum()
    }

    /// Whether any deletion failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// The tally line printed at the end of a prune.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Deleted {} file(s), {} failed, freed {} bytes",
            self.deleted_count(),
            self.failed_count(),
            self.bytes_freed
        )
    }
}

/// Compute the keep/delete split without touching the filesystem.
#[must_use]
pub fn plan_prune(sets: &[DuplicateSet]) -> PruneReport {
    let mut report = PruneReport {
        dry_run: true,
        ..Default::default()
    };

    for set in sets {
        let Some(retained) = set.retained() else {
            continue;
        };
        let deleted: Vec<PathBuf> = set.removable().iter().map(|f| f.path.clone()).collect();
        report.bytes_freed += set.wasted_space();
        report.groups.push(PruneOutcome {
            size: set.size(),
            hash: set.digest_hex(),
            retained: retained.path.clone(),
            deleted,
            failed: Vec::new(),
        });
    }

    log::info!("Dry run: {}", report.summary());
    report
}

/// Keep the first member of each set and delete the rest.
#[must_use]
pub fn prune_sets(sets: &[DuplicateSet], config: &DeleteConfig) -> PruneReport {
    let mut report = PruneReport::default();

    for set in sets {
        let Some(retained) = set.retained() else {
            continue;
        };

        let targets: Vec<FileSnapshot> = set
            .removable()
            .iter()
            .map(FileSnapshot::from_entry)
            .collect();
        let selected: Vec<PathBuf> = targets.iter().map(|t| t.path.clone()).collect();
        if let Err(e) = validate_preserves_copy(&selected, &set.paths()) {
            log::error!("Skipping set {}: {}", set.digest_hex(), e);
            continue;
        }

        if let Err(e) = check_retained(retained, config) {
            log::error!(
                "Skipping set {}: kept copy {} is no longer usable: {}",
                set.digest_hex(),
                retained.path.display(),
                e
            );
            report.groups.push(PruneOutcome {
                size: set.size(),
                hash: set.digest_hex(),
                retained: retained.path.clone(),
                deleted: Vec::new(),
                failed: vec![(retained.path.clone(), e)],
            });
            if !config.continue_on_error {
                report.stopped = true;
                break;
            }
            continue;
        }

        log::debug!(
            "Pruning set {}: keeping {}, removing {}",
            set.digest_hex(),
            retained.path.display(),
            targets.len()
        );

        let batch = delete_batch(&targets, config);
        report.bytes_freed += batch.bytes_freed;
        report.groups.push(PruneOutcome {
            size: set.size(),
            hash: set.digest_hex(),
            retained: retained.path.clone(),
            deleted: batch.successes.into_iter().map(|s| s.path).collect(),
            failed: batch.failures,
        });

        if batch.stopped {
            report.stopped = true;
            break;
        }
    }

    log::info!("{}", report.summary());
    report
}

/// The kept member must still exist, and with `verify_size` still have its
/// scanned size, before any other member of its set is removed.
fn check_retained(retained: &FileEntry, config: &DeleteConfig) -> Result<(), DeletionError> {
    if config.verify_size {
        FileSnapshot::from_entry(retained).verify()
    } else {
        FileSnapshot::capture(&retained.path).map(|_| ())
    }
}
