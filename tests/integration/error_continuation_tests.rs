use dupsort::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupsort::scanner::{EntryError, FileEntry, HashError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_find_duplicates_from_files_continues_on_error() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, b"0123456789").unwrap();
    fs::write(&b, b"0123456789").unwrap();

    let files = vec![
        FileEntry::new(a.clone(), 10),
        FileEntry::new(dir.path().join("vanished.txt"), 10),
        FileEntry::new(b.clone(), 10),
    ];
    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths(), vec![a, b]);
    assert_eq!(summary.warnings.len(), 1);
    match &summary.warnings[0] {
        EntryError::Hash(HashError::NotFound(path)) => assert!(path.ends_with("vanished.txt")),
        other => panic!("Expected NotFound hash warning, got: {:?}", other),
    }
    assert_eq!(summary.warnings[0].reason(), "not found");
}

#[test]
fn test_find_duplicates_from_files_strict_fails() {
    let config = FinderConfig::default().with_strict(true);
    let finder = DuplicateFinder::new(config);
    // Same size so both reach hashing
    let files = vec![
        FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100),
        FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100),
    ];

    match finder.find_duplicates_from_files(files) {
        Err(FinderError::Hash(HashError::NotFound(path))) => {
            assert_eq!(path, PathBuf::from("nonexistent_1.txt"));
        }
        other => panic!("Expected NotFound hash error, got: {:?}", other.map(|r| r.0)),
    }
}

#[test]
fn test_unique_size_is_never_opened() {
    // A missing file with a unique size is eliminated before hashing
    let files = vec![FileEntry::new(PathBuf::from("ghost.bin"), 42)];
    let (sets, summary) = DuplicateFinder::new(FinderConfig::default().with_strict(true))
        .find_duplicates_from_files(files)
        .unwrap();

    assert!(sets.is_empty());
    assert!(summary.warnings.is_empty());
    assert_eq!(summary.eliminated_by_size, 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_a_warning() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("a"), b"dup").unwrap();
    fs::write(root.join("b"), b"dup").unwrap();
    let locked = root.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("hidden"), b"dup").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not stop root
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let lenient = DuplicateFinder::with_defaults().find_duplicates(root);
    let strict =
        DuplicateFinder::new(FinderConfig::default().with_strict(true)).find_duplicates(root);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (sets, summary) = lenient.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].path(), locked.as_path());
    assert_eq!(summary.warnings[0].reason(), "permission denied");

    assert!(matches!(strict, Err(FinderError::Traversal(_))));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_a_warning() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("a"), b"same").unwrap();
    fs::write(root.join("b"), b"same").unwrap();
    let locked = root.join("c");
    fs::write(&locked, b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::File::open(&locked).is_ok() {
        return;
    }

    let (sets, summary) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
    assert!(matches!(
        &summary.warnings[..],
        [EntryError::Hash(HashError::PermissionDenied(_))]
    ));
}

#[test]
fn test_vanished_file_is_a_warning_unless_strict() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();
    let gone = dir.path().join("gone");
    let files = vec![
        FileEntry::new(a.clone(), 4),
        FileEntry::new(b.clone(), 4),
        FileEntry::new(gone.clone(), 4),
    ];

    let lenient = DuplicateFinder::with_defaults().find_duplicates_from_files(files.clone());
    let strict = DuplicateFinder::new(FinderConfig::default().with_strict(true))
        .find_duplicates_from_files(files);

    let (sets, summary) = lenient.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths(), vec![a, b]);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].path(), gone.as_path());
    assert_eq!(summary.warnings[0].reason(), "not found");

    match strict {
        Err(FinderError::Hash(HashError::NotFound(path))) => assert_eq!(path, gone),
        other => panic!("Expected NotFound hash error, got: {:?}", other.map(|r| r.0)),
    }
}

#[test]
fn test_vanished_file_under_paranoid_verification() {
    let dir = TempDir::new().unwrap();
    let files: Vec<FileEntry> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, b"same").unwrap();
            FileEntry::new(path, 4)
        })
        .collect();
    let gone = FileEntry::new(dir.path().join("0_gone"), 4);
    let mut all = vec![gone.clone()];
    all.extend(files.iter().cloned());

    let (sets, summary) = DuplicateFinder::new(FinderConfig::default().with_paranoid(true))
        .find_duplicates_from_files(all)
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 3);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].path(), gone.path.as_path());
}

#[cfg(unix)]
#[test]
fn test_unreadable_entry_is_an_io_warning() {
    // A directory opens on unix but cannot be read as a file, whatever the uid
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let not_a_file = dir.path().join("sub");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();
    fs::create_dir(&not_a_file).unwrap();
    let files = vec![
        FileEntry::new(a, 4),
        FileEntry::new(b, 4),
        FileEntry::new(not_a_file.clone(), 4),
    ];

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files.clone())
        .unwrap();
    assert_eq!(sets.len(), 1);
    assert!(matches!(
        &summary.warnings[..],
        [EntryError::Hash(HashError::Io { .. })]
    ));
    assert_eq!(summary.warnings[0].path(), not_a_file.as_path());

    let strict = DuplicateFinder::new(FinderConfig::default().with_strict(true))
        .find_duplicates_from_files(files);
    assert!(matches!(strict, Err(FinderError::Hash(HashError::Io { .. }))));
}
