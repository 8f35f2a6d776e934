use clap::Parser;
use dupsort::actions::{plan_prune, prune_sets, DeleteConfig};
use dupsort::cli::Cli;
use dupsort::duplicates::{DuplicateFinder, FinderError};
use dupsort::error::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn populate(root: &Path) {
    fs::write(root.join("a1.txt"), b"alpha alpha").unwrap();
    fs::write(root.join("a2.txt"), b"alpha alpha").unwrap();
    fs::write(root.join("a3.txt"), b"alpha alpha").unwrap();
    fs::write(root.join("b1.txt"), b"beta").unwrap();
    fs::write(root.join("b2.txt"), b"beta").unwrap();
    fs::write(root.join("keep.txt"), b"not duplicated").unwrap();
}

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let cli = Cli::try_parse_from(args).unwrap();
    dupsort::run_app(cli)
}

#[test]
fn test_prune_keeps_first_of_each_set() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    populate(root);

    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    let report = prune_sets(&sets, &DeleteConfig::permanent());

    assert!(!report.has_failures());
    assert_eq!(report.deleted_count(), 3);
    assert_eq!(report.bytes_freed, 11 * 2 + 4);

    assert!(root.join("a1.txt").exists());
    assert!(!root.join("a2.txt").exists());
    assert!(!root.join("a3.txt").exists());
    assert!(root.join("b1.txt").exists());
    assert!(!root.join("b2.txt").exists());
    assert!(root.join("keep.txt").exists());

    let (after, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    assert!(after.is_empty());
}

#[test]
fn test_dry_run_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    populate(root);

    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    let report = plan_prune(&sets);

    assert!(report.dry_run);
    assert_eq!(report.deleted_count(), 3);
    for name in ["a1.txt", "a2.txt", "a3.txt", "b1.txt", "b2.txt"] {
        assert!(root.join(name).exists(), "{} was removed", name);
    }
}

#[test]
fn test_prune_skips_file_changed_since_scan() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    populate(root);

    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    fs::write(root.join("b2.txt"), b"beta, but longer now").unwrap();

    let report = prune_sets(&sets, &DeleteConfig::permanent());

    assert!(report.has_failures());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.deleted_count(), 2);
    assert!(root.join("b2.txt").exists());
}

#[test]
fn test_run_app_report_leaves_files() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    populate(root);
    let path = root.to_string_lossy().to_string();

    let code = run(&["dupsort", "-q", "report", path.as_str()]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(root.join("a3.txt").exists());
}

#[test]
fn test_run_app_prune_dry_run_json() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    populate(root);
    let path = root.to_string_lossy().to_string();

    let code = run(&["dupsort", "prune", path.as_str(), "--dry-run", "-o", "json"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(root.join("a2.txt").exists());
}

#[test]
fn test_run_app_prune_deletes() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    populate(root);
    let path = root.to_string_lossy().to_string();

    let code = run(&["dupsort", "-q", "prune", path.as_str(), "--members", "path"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(root.join("a1.txt").exists());
    assert!(!root.join("a2.txt").exists());
    assert!(root.join("keep.txt").exists());
}

#[test]
fn test_run_app_missing_root_is_general_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope").to_string_lossy().to_string();

    let err = run(&["dupsort", "-q", "report", missing.as_str()]).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));
}

#[test]
fn test_prune_spares_set_whose_kept_copy_vanished() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    populate(root);

    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    fs::remove_file(root.join("a1.txt")).unwrap();
    let report = prune_sets(&sets, &DeleteConfig::permanent());

    assert!(report.has_failures());
    assert!(root.join("a2.txt").exists());
    assert!(root.join("a3.txt").exists());
    assert!(root.join("b1.txt").exists());
    assert!(!root.join("b2.txt").exists());
    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.bytes_freed, 4);
}
