//! dupsort - duplicate file finder
//!
//! Walks a directory tree, groups regular files by size, hashes the
//! candidates with BLAKE3 and reports each set of byte-identical files,
//! ordered by file size. `prune` keeps the first file of every set and
//! deletes the rest.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{plan_prune, prune_sets, DeleteConfig, PruneReport};
use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateSet, FinderConfig, ScanSummary};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::WalkerConfig;

/// Run a parsed command line and return the process exit code.
///
/// # Errors
///
/// Returns an error for a bad root path or configuration, an interrupt,
/// a strict-mode entry error, or a failure writing the report.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let args = cli.command.scan_args();
    let trash_flag = matches!(&cli.command, Commands::Prune(prune) if prune.trash);
    let config = Config::from_cli(args, trash_flag)?;
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler().context("Failed to set up Ctrl+C handling")?;

    let mut finder_config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_extension(config.extension.clone()))
        .with_strict(config.strict)
        .with_paranoid(config.paranoid)
        .with_skip_empty(config.skip_empty)
        .with_io_threads(config.io_threads)
        .with_ordering(config.ordering())
        .with_shutdown_flag(shutdown.get_flag());
    if !cli.quiet && args.output == OutputFormat::Text {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (sets, summary) = finder
        .find_duplicates(&args.path)
        .with_context(|| format!("Scan of {} failed", args.path.display()))?;

    let prune = match &cli.command {
        Commands::Report(_) => None,
        Commands::Prune(prune) if prune.dry_run => Some(plan_prune(&sets)),
        Commands::Prune(_) => {
            if shutdown.is_shutdown_requested() {
                return Err(duplicates::FinderError::Interrupted.into());
            }
            let delete_config = if config.trash {
                DeleteConfig::trash()
            } else {
                DeleteConfig::permanent()
            };
            Some(prune_sets(&sets, &delete_config))
        }
    };

    let exit_code = match &prune {
        Some(report) if report.has_failures() => ExitCode::PartialSuccess,
        _ => ExitCode::Success,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => write_text(&mut out, &sets, &summary, prune.as_ref())?,
        OutputFormat::Json => JsonOutput::new(&sets, &summary, prune.as_ref(), exit_code)
            .write_to(&mut out, true)
            .context("Failed to write JSON report")?,
    }
    out.flush().context("Failed to flush report")?;

    Ok(exit_code)
}

fn write_text<W: Write>(
    out: &mut W,
    sets: &[DuplicateSet],
    summary: &ScanSummary,
    prune: Option<&PruneReport>,
) -> Result<()> {
    let mut report = TextOutput::new(sets, &summary.warnings);
    if let Some(prune) = prune {
        report = report.with_prune(prune);
    }
    report
        .write_to(out)
        .context("Failed to write report")?;

    log::info!(
        "{} files scanned ({}), {} duplicate sets, {} reclaimable, {:.1?}",
        summary.total_files,
        summary.total_size_display(),
        summary.duplicate_groups,
        summary.reclaimable_display(),
        summary.scan_duration
    );
    Ok(())
}
