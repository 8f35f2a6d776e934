//! Command-line interface definitions for dupsort.
//!
//! This module defines all CLI arguments and subcommands using the clap derive
//! API. Global options (verbosity, error format) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Report duplicate sets, largest first
//! dupsort report ~/Downloads
//!
//! # Only .jpg files, smallest first, as JSON
//! dupsort report ~/Pictures --ext jpg --order asc --output json
//!
//! # See what a prune would delete, then do it
//! dupsort prune ~/Downloads --dry-run
//! dupsort prune ~/Downloads --trash
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use crate::duplicates::{MemberOrder, SortDirection};

/// Find duplicate files by size and content hash, ordered by size.
#[derive(Debug, Parser)]
#[command(name = "dupsort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as structured JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report duplicate sets without changing anything
    Report(ScanArgs),

    /// Keep the first file of each duplicate set and delete the rest
    Prune(PruneArgs),
}

impl Commands {
    /// Scan options shared by every subcommand.
    #[must_use]
    pub fn scan_args(&self) -> &ScanArgs {
        match self {
            Self::Report(args) => args,
            Self::Prune(args) => &args.scan,
        }
    }
}

/// Options controlling the scan.
///
/// Every option left unset falls back to the config file, then the
/// `DUPSORT_` environment, then the built-in default.
#[derive(Debug, Clone, Args, Serialize)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    #[serde(skip)]
    pub path: PathBuf,

    /// Only consider files with this extension (case-sensitive, no dot)
    #[arg(short, long = "ext", value_name = "EXT")]
    #[serde(rename = "extension", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Order sets by size
    #[arg(long, value_enum, value_name = "ORDER")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortDirection>,

    /// Order files within each set (the first one is kept by prune)
    #[arg(long, value_enum, value_name = "ORDER")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<MemberOrder>,

    /// Abort on the first unreadable directory or file
    #[arg(long)]
    #[serde(skip_serializing_if = "is_false")]
    pub strict: bool,

    /// Confirm hash matches byte for byte
    #[arg(long)]
    #[serde(skip_serializing_if = "is_false")]
    pub paranoid: bool,

    /// Leave zero-byte files out
    #[arg(long)]
    #[serde(skip_serializing_if = "is_false")]
    pub skip_empty: bool,

    /// Number of threads hashing in parallel
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_threads: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    #[serde(skip)]
    pub output: OutputFormat,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    #[serde(skip)]
    pub config: Option<PathBuf>,
}

/// Options for the prune subcommand.
#[derive(Debug, Clone, Args)]
pub struct PruneArgs {
    /// Scan options
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Move files to the system trash instead of deleting them
    #[arg(long)]
    pub trash: bool,

    /// Show what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text report
    #[default]
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
