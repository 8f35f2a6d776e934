//! Plain-text report.
//!
//! Each set is printed as its per-file size, its digest, one path per line
//! and a blank separator line:
//!
//! ```text
//! 10 bytes
//! Hash: 5c1f...e3
//! /data/a.txt
//! /data/b.txt
//!
//! ```
//!
//! After a prune each path line is annotated with what happened to it and a
//! tally line closes the report. Skipped entries follow in a `Warnings:`
//! section.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::actions::{DeletionError, PruneOutcome, PruneReport};
use crate::duplicates::DuplicateSet;
use crate::scanner::EntryError;

/// Renderer for the plain-text report.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    sets: &'a [DuplicateSet],
    warnings: &'a [EntryError],
    prune: Option<&'a PruneReport>,
}

impl<'a> TextOutput<'a> {
    /// Create a report for the given sets and skipped entries.
    #[must_use]
    pub fn new(sets: &'a [DuplicateSet], warnings: &'a [EntryError]) -> Self {
        Self {
            sets,
            warnings,
            prune: None,
        }
    }

    /// Annotate path lines with the outcome of a prune.
    #[must_use]
    pub fn with_prune(mut self, report: &'a PruneReport) -> Self {
        self.prune = Some(report);
        self
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (index, set) in self.sets.iter().enumerate() {
            writeln!(writer, "{} bytes", set.size())?;
            writeln!(writer, "Hash: {}", set.digest_hex())?;

            let outcome = self.prune.and_then(|report| report.groups.get(index));
            match (self.prune, outcome) {
                (Some(report), Some(outcome)) => {
                    write_pruned_set(writer, set, outcome, report.dry_run)?;
                }
                _ => {
                    for file in set.files() {
                        writeln!(writer, "{}", file.path.display())?;
                    }
                }
            }
            writeln!(writer)?;
        }

        if let Some(report) = self.prune {
            writeln!(writer, "{}", report.summary())?;
        }

        if !self.warnings.is_empty() {
            if self.prune.is_some() {
                writeln!(writer)?;
            }
            writeln!(writer, "Warnings:")?;
            for warning in self.warnings {
                writeln!(writer, "{}: {}", warning.path().display(), warning.reason())?;
            }
        }

        Ok(())
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

fn write_pruned_set<W: Write>(
    writer: &mut W,
    set: &DuplicateSet,
    outcome: &PruneOutcome,
    dry_run: bool,
) -> io::Result<()> {
    let deleted_label = if dry_run { "would delete" } else { "deleted" };
    let deleted: Vec<&PathBuf> = outcome.deleted.iter().collect();
    let failed: HashMap<&Path, &DeletionError> = outcome
        .failed
        .iter()
        .map(|(path, err)| (path.as_path(), err))
        .collect();

    for file in set.files() {
        let path = file.path.as_path();
        if let Some(err) = failed.get(path) {
            writeln!(writer, "failed: {} ({})", path.display(), err)?;
        } else if path == outcome.retained {
            writeln!(writer, "kept: {}", path.display())?;
        } else if deleted.iter().any(|p| p.as_path() == path) {
            writeln!(writer, "{}: {}", deleted_label, path.display())?;
        } else {
            writeln!(writer, "{}", path.display())?;
        }
    }
    Ok(())
}
