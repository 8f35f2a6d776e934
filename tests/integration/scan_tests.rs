use dupsort::duplicates::{
    DuplicateFinder, FinderConfig, FinderError, MemberOrder, OrderingPolicy, SortDirection,
};
use dupsort::scanner::{hash_to_hex, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn test_full_scan_groups_by_content() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "a.txt", b"hello world");
    write(root, "nested/b.txt", b"hello world");
    write(root, "c.txt", b"hello WORLD");
    write(root, "unique.bin", b"only one of these");

    let (sets, summary) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size(), 11);
    assert_eq!(names(&sets[0].paths(), root), vec!["a.txt", "nested/b.txt"]);
    assert_eq!(
        sets[0].digest_hex(),
        hash_to_hex(blake3::hash(b"hello world").as_bytes())
    );

    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 11);
    assert!(!summary.has_warnings());
}

#[test]
fn test_sets_descending_by_default() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    for (name, content) in [
        ("s1", &b"xy"[..]),
        ("s2", &b"xy"[..]),
        ("l1", &b"large content"[..]),
        ("l2", &b"large content"[..]),
        ("m1", &b"medium"[..]),
        ("m2", &b"medium"[..]),
    ] {
        write(root, name, content);
    }

    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    let sizes: Vec<u64> = sets.iter().map(|s| s.size()).collect();
    assert_eq!(sizes, vec![13, 6, 2]);

    let config = FinderConfig::default()
        .with_ordering(OrderingPolicy::new(SortDirection::Ascending, MemberOrder::Path));
    let (sets, _) = DuplicateFinder::new(config).find_duplicates(root).unwrap();
    let sizes: Vec<u64> = sets.iter().map(|s| s.size()).collect();
    assert_eq!(sizes, vec![2, 6, 13]);
}

#[test]
fn test_same_size_different_content_splits() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "a1", b"aaaa");
    write(root, "a2", b"aaaa");
    write(root, "b1", b"bbbb");
    write(root, "b2", b"bbbb");
    write(root, "c1", b"cccc");

    let (sets, summary) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    assert_eq!(sets.len(), 2);
    assert!(sets.iter().all(|s| s.size() == 4 && s.len() == 2));
    assert_ne!(sets[0].digest(), sets[1].digest());
    // Equal sizes keep the order the digests were first seen in
    assert_eq!(names(&sets[0].paths(), root), vec!["a1", "a2"]);
    assert_eq!(names(&sets[1].paths(), root), vec!["b1", "b2"]);
    assert_eq!(summary.bytes_hashed, 20);
}

#[test]
fn test_every_file_in_at_most_one_set() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    for i in 0..6 {
        write(root, &format!("dup{}.dat", i), b"same bytes");
        write(root, &format!("other{}.dat", i), format!("unique {}", i).as_bytes());
    }

    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    let mut seen = std::collections::HashSet::new();
    for set in &sets {
        assert!(set.len() >= 2);
        for file in set.files() {
            assert_eq!(file.size, set.size());
            assert!(seen.insert(file.path.clone()), "{:?} listed twice", file.path);
        }
    }
}

#[test]
fn test_extension_filter_is_case_sensitive() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "one.jpg", b"pixels");
    write(root, "two.jpg", b"pixels");
    write(root, "three.JPG", b"pixels");
    write(root, "four.png", b"pixels");

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_extension(Some("jpg".to_string())));
    let (sets, summary) = DuplicateFinder::new(config).find_duplicates(root).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(sets.len(), 1);
    assert_eq!(names(&sets[0].paths(), root), vec!["one.jpg", "two.jpg"]);
}

#[test]
fn test_empty_files_form_a_set() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "e1", b"");
    write(root, "e2", b"");

    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size(), 0);
    assert_eq!(sets[0].digest_hex(), hash_to_hex(blake3::hash(b"").as_bytes()));

    let config = FinderConfig::default().with_skip_empty(true);
    let (sets, summary) = DuplicateFinder::new(config).find_duplicates(root).unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.empty_files, 2);
}

#[test]
fn test_paranoid_agrees_with_digest() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "x1", &[7u8; 20_000]);
    write(root, "x2", &[7u8; 20_000]);
    write(root, "x3", &[7u8; 20_000]);

    let config = FinderConfig::default().with_paranoid(true);
    let (sets, summary) = DuplicateFinder::new(config).find_duplicates(root).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 3);
    assert_eq!(summary.verification_splits, 0);
}

#[test]
fn test_single_io_thread_matches_many() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    for i in 0..10 {
        write(root, &format!("f{:02}", i), format!("group {}", i % 3).as_bytes());
    }

    let serial = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates(root)
        .unwrap()
        .0;
    let parallel = DuplicateFinder::new(FinderConfig::default().with_io_threads(8))
        .find_duplicates(root)
        .unwrap()
        .0;

    assert_eq!(serial, parallel);
}

#[test]
fn test_bad_roots() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "plain.txt", b"x");

    let finder = DuplicateFinder::with_defaults();
    assert!(matches!(
        finder.find_duplicates(&dir.path().join("missing")),
        Err(FinderError::PathNotFound(_))
    ));
    assert!(matches!(
        finder.find_duplicates(&file),
        Err(FinderError::NotADirectory(_))
    ));
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let target = write(root, "real.txt", b"linked content");
    std::os::unix::fs::symlink(&target, root.join("link.txt")).unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_extension_scenario_and_idempotence() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "a.txt", b"XXXXXXXXXX");
    write(root, "b.txt", b"XXXXXXXXXX");
    write(root, "c.txt", b"YYYYYYYYYY");
    write(root, "d.log", b"XXXXXXXXXX");

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_extension(Some("txt".to_string())));
    let finder = DuplicateFinder::new(config);

    let (first, _) = finder.find_duplicates(root).unwrap();
    let (second, _) = finder.find_duplicates(root).unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].size(), 10);
    assert_eq!(names(&first[0].paths(), root), vec!["a.txt", "b.txt"]);
    assert_eq!(first, second);
}
