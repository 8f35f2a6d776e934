//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     { "hash": "abc123...", "size": 1024, "files": ["/a.txt", "/b.txt"] }
//!   ],
//!   "warnings": [
//!     { "path": "/locked", "reason": "permission denied" }
//!   ],
//!   "prune": {
//!     "groups": [
//!       { "size": 1024, "hash": "abc123...", "retained": "/a.txt",
//!         "deleted": ["/b.txt"], "failed": [] }
//!     ],
//!     "deleted": 1,
//!     "failed": 0,
//!     "bytes_freed": 1024,
//!     "dry_run": false
//!   },
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```
//!
//! `prune` is `null` for a plain report.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::actions::{PruneOutcome, PruneReport};
use crate::duplicates::{DuplicateSet, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::EntryError;

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateSet {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Member paths in within-set order
    pub files: Vec<String>,
}

impl JsonDuplicateSet {
    /// Create a JSON duplicate set.
    #[must_use]
    pub fn from_set(set: &DuplicateSet) -> Self {
        Self {
            hash: set.digest_hex(),
            size: set.size(),
            files: set.files().iter().map(|f| path_string(&f.path)).collect(),
        }
    }
}

/// A skipped entry in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonWarning {
    /// Path of the skipped entry
    pub path: String,
    /// Why it was skipped
    pub reason: String,
}

impl JsonWarning {
    fn from_entry_error(err: &EntryError) -> Self {
        Self {
            path: path_string(err.path()),
            reason: err.reason(),
        }
    }
}

/// A failed deletion in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    /// Path that could not be deleted
    pub path: String,
    /// Error message
    pub reason: String,
}

/// Prune outcome for one set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPruneGroup {
    /// File size in bytes
    pub size: u64,
    /// BLAKE3 hash as hexadecimal string
    pub hash: String,
    /// The kept member
    pub retained: String,
    /// Removed members
    pub deleted: Vec<String>,
    /// Members that could not be removed
    pub failed: Vec<JsonFailure>,
}

impl JsonPruneGroup {
    fn from_outcome(outcome: &PruneOutcome) -> Self {
        Self {
            size: outcome.size,
            hash: outcome.hash.clone(),
            retained: path_string(&outcome.retained),
            deleted: outcome.deleted.iter().map(|p| path_string(p)).collect(),
            failed: outcome
                .failed
                .iter()
                .map(|(path, err)| JsonFailure {
                    path: path_string(path),
                    reason: err.to_string(),
                })
                .collect(),
        }
    }
}

/// Prune report in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPrune {
    /// One entry per set
    pub groups: Vec<JsonPruneGroup>,
    /// Number of files removed
    pub deleted: usize,
    /// Number of files that could not be removed
    pub failed: usize,
    /// Bytes freed
    pub bytes_freed: u64,
    /// Whether nothing was actually deleted
    pub dry_run: bool,
}

impl JsonPrune {
    /// Create the JSON prune section.
    #[must_use]
    pub fn from_report(report: &PruneReport) -> Self {
        Self {
            groups: report
                .groups
                .iter()
                .map(JsonPruneGroup::from_outcome)
                .collect(),
            deleted: report.deleted_count(),
            failed: report.failed_count(),
            bytes_freed: report.bytes_freed,
            dry_run: report.dry_run,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of confirmed duplicate sets
    pub duplicate_groups: usize,
    /// Total number of redundant copies
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate sets in report order
    pub duplicates: Vec<JsonDuplicateSet>,
    /// Skipped entries
    pub warnings: Vec<JsonWarning>,
    /// Prune outcome, if a prune ran
    pub prune: Option<JsonPrune>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from sets, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupsort::duplicates::ScanSummary;
    /// use dupsort::output::json::JsonOutput;
    /// use dupsort::error::ExitCode;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), None, ExitCode::Success);
    /// assert!(output.duplicates.is_empty());
    /// assert!(output.prune.is_none());
    /// ```
    #[must_use]
    pub fn new(
        sets: &[DuplicateSet],
        summary: &ScanSummary,
        prune: Option<&PruneReport>,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            duplicates: sets.iter().map(JsonDuplicateSet::from_set).collect(),
            warnings: summary
                .warnings
                .iter()
                .map(JsonWarning::from_entry_error)
                .collect(),
            prune: prune.map(JsonPrune::from_report),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Paths are reported as discovered; deleted files can no longer be
/// canonicalized.
fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
