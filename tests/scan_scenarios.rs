use duplicate_scanner::{remove_duplicates, ScanMode, Scanner, SkipReason, Stage};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn names(members: &BTreeSet<PathBuf>) -> Vec<&str> {
    members.iter().map(|p| p.to_str().unwrap()).collect()
}

fn write_hello_world(dir: &Path) {
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(dir.join(name), b"hello").unwrap();
    }
    fs::write(dir.join("d.txt"), b"world").unwrap();
}

#[test]
fn test_three_identical_files_form_one_set() {
    let dir = tempdir().unwrap();
    write_hello_world(dir.path());

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert_eq!(report.sets.len(), 1);
    let set = report.sets.iter().next().unwrap();
    assert_eq!(names(&set.members), vec!["a.txt", "b.txt", "c.txt"]);
    assert_eq!(set.size, 5);
    assert!(report
        .sets
        .iter()
        .all(|set| !set.contains(Path::new("d.txt"))));
    assert_eq!(report.stats.files_found, 4);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_shared_prefix_with_different_tail_is_not_duplicate() {
    let dir = tempdir().unwrap();
    let size = 10 * 1024 * 1024;
    let mut content = vec![0xABu8; size];
    fs::write(dir.path().join("big1.bin"), &content).unwrap();
    content[5_000_000] = 0xCD;
    fs::write(dir.path().join("big2.bin"), &content).unwrap();

    let mut scanner = Scanner::new();
    scanner.set_chunk_size(64 * 1024);
    let report = scanner.scan(dir.path()).unwrap();

    assert!(report.sets.is_empty());
    assert_eq!(report.stats.size_candidates, 2);
    assert_eq!(report.stats.prefix_candidates, 2);
    assert_eq!(report.stats.full_hashed, 2);
}

#[test]
fn test_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("e1.txt"), b"").unwrap();
    fs::write(dir.path().join("e2.txt"), b"").unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert_eq!(report.sets.len(), 1);
    let set = report.sets.iter().next().unwrap();
    assert_eq!(names(&set.members), vec!["e1.txt", "e2.txt"]);
    assert_eq!(report.wasted_space(), 0);
}

#[test]
fn test_unique_size_never_hashed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), b"1").unwrap();
    fs::write(dir.path().join("two"), b"22").unwrap();
    fs::write(dir.path().join("three"), b"333").unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert!(report.sets.is_empty());
    assert_eq!(report.stats.files_found, 3);
    assert_eq!(report.stats.size_candidates, 0);
    assert_eq!(report.stats.full_hashed, 0);
}

#[test]
fn test_same_size_different_prefix_pruned_before_full_hash() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("left"), b"aaaa").unwrap();
    fs::write(dir.path().join("right"), b"bbbb").unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert!(report.sets.is_empty());
    assert_eq!(report.stats.size_candidates, 2);
    assert_eq!(report.stats.prefix_candidates, 0);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    write_hello_world(dir.path());
    fs::write(dir.path().join("x.bin"), b"xyz").unwrap();
    fs::write(dir.path().join("y.bin"), b"xyz").unwrap();

    let scanner = Scanner::new();
    let first = scanner.scan(dir.path()).unwrap();
    let second = scanner.scan(dir.path()).unwrap();

    assert_eq!(first.sets, second.sets);
    assert_eq!(first.sets.len(), 2);
}

#[cfg(unix)]
#[test]
fn test_symlink_is_resolved_to_its_target() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    fs::write(&target, b"linked content").unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("other-link.txt")).unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert_eq!(report.stats.files_found, 1);
    assert_eq!(report.stats.size_candidates, 0);
    assert!(report.sets.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlink_and_real_copy() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    fs::write(&target, b"payload").unwrap();
    fs::write(dir.path().join("copy.txt"), b"payload").unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert_eq!(report.stats.files_found, 2);
    assert_eq!(report.sets.len(), 1);
    let set = report.sets.iter().next().unwrap();
    assert_eq!(names(&set.members), vec!["copy.txt", "target.txt"]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_not_descended() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    fs::write(outside.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("elsewhere")).unwrap();

    let mut scanner = Scanner::new();
    scanner.set_mode(ScanMode::Recursive);
    let report = scanner.scan(dir.path()).unwrap();

    assert_eq!(report.stats.files_found, 1);
    assert!(report.sets.is_empty());
}

#[cfg(unix)]
#[test]
fn test_broken_link_reported_with_reason() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"q").unwrap();
    fs::write(dir.path().join("b"), b"q").unwrap();
    std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("dangling")).unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert_eq!(report.sets.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].stage, Stage::Traversal);
    assert!(matches!(report.skipped[0].reason, SkipReason::Unresolvable(_)));
    assert!(report.skipped[0].path.ends_with("dangling"));
}

#[test]
fn test_delete_leaves_one_copy() {
    let dir = tempdir().unwrap();
    write_hello_world(dir.path());

    let report = Scanner::new().scan(dir.path()).unwrap();
    let deletion = remove_duplicates(dir.path(), &report.sets, false);

    assert_eq!(deletion.actions.success_count(), 2);
    assert_eq!(deletion.actions.error_count(), 0);

    let remaining: Vec<_> = ["a.txt", "b.txt", "c.txt"]
        .iter()
        .filter(|name| dir.path().join(name).exists())
        .collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(fs::read(dir.path().join(remaining[0])).unwrap(), b"hello");
    assert!(dir.path().join("d.txt").exists());

    let rescan = Scanner::new().scan(dir.path()).unwrap();
    assert!(rescan.sets.is_empty());
}

#[test]
fn test_recursive_delete_uses_full_paths() {
    let dir = tempdir().unwrap();
    for sub in ["one", "two", "three"] {
        fs::create_dir(dir.path().join(sub)).unwrap();
        fs::write(dir.path().join(sub).join("same.txt"), b"nested").unwrap();
    }

    let mut scanner = Scanner::new();
    scanner.set_mode(ScanMode::Recursive);
    let report = scanner.scan(dir.path()).unwrap();
    assert_eq!(report.sets.len(), 1);
    assert_eq!(report.sets.iter().next().unwrap().len(), 3);

    let deletion = remove_duplicates(dir.path(), &report.sets, false);
    assert_eq!(deletion.actions.success_count(), 2);

    let remaining = ["one", "two", "three"]
        .iter()
        .filter(|sub| dir.path().join(sub).join("same.txt").exists())
        .count();
    assert_eq!(remaining, 1);
}

#[cfg(unix)]
#[test]
fn test_outside_link_sharing_a_root_basename() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    fs::write(dir.path().join("target.txt"), b"UNIQUE-A").unwrap();
    fs::write(dir.path().join("copy.txt"), b"payload").unwrap();
    let external = outside.path().join("target.txt");
    fs::write(&external, b"payload").unwrap();
    std::os::unix::fs::symlink(&external, dir.path().join("link")).unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert_eq!(report.sets.len(), 1);
    let set = report.sets.iter().next().unwrap();
    assert_eq!(names(&set.members), vec!["copy.txt", "link"]);

    let deletion = remove_duplicates(dir.path(), &report.sets, false);
    assert_eq!(deletion.actions.error_count(), 0);
    assert_eq!(fs::read(dir.path().join("target.txt")).unwrap(), b"UNIQUE-A");
    assert_eq!(fs::read(&external).unwrap(), b"payload");
    assert!(dir.path().join("copy.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_outside_link_with_same_name_as_its_duplicate() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same bytes").unwrap();
    fs::write(outside.path().join("a.txt"), b"same bytes").unwrap();
    std::os::unix::fs::symlink(outside.path().join("a.txt"), dir.path().join("alias")).unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    assert_eq!(report.sets.len(), 1);
    let set = report.sets.iter().next().unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(names(&set.members), vec!["a.txt", "alias"]);
}

#[cfg(unix)]
#[test]
fn test_link_targets_with_same_basename_stay_apart() {
    let dir = tempdir().unwrap();
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("data.txt"), b"one").unwrap();
    fs::write(second.path().join("data.txt"), b"two").unwrap();
    std::os::unix::fs::symlink(first.path().join("data.txt"), dir.path().join("link1")).unwrap();
    std::os::unix::fs::symlink(second.path().join("data.txt"), dir.path().join("link2")).unwrap();
    fs::write(dir.path().join("data.txt"), b"one").unwrap();
    fs::write(dir.path().join("two.txt"), b"two").unwrap();

    let report = Scanner::new().scan(dir.path()).unwrap();

    let sets: Vec<Vec<&str>> = report.sets.iter().map(|set| names(&set.members)).collect();
    assert_eq!(sets.len(), 2);
    assert!(sets.contains(&vec!["data.txt", "link1"]));
    assert!(sets.contains(&vec!["link2", "two.txt"]));
}

#[cfg(unix)]
#[test]
fn test_recursive_delete_stays_under_root() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    let external = outside.path().join("external.txt");
    fs::write(&external, b"payload").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("copy.txt"), b"payload").unwrap();
    std::os::unix::fs::symlink(&external, dir.path().join("link")).unwrap();

    let mut scanner = Scanner::new();
    scanner.set_mode(ScanMode::Recursive);
    let report = scanner.scan(dir.path()).unwrap();

    let root = fs::canonicalize(dir.path()).unwrap();
    assert_eq!(report.sets.len(), 1);
    let set = report.sets.iter().next().unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.members.iter().all(|m| m.starts_with(&root)));

    let deletion = remove_duplicates(dir.path(), &report.sets, false);
    assert_eq!(deletion.actions.error_count(), 0);
    assert_eq!(deletion.actions.success_count(), 1);
    assert_eq!(fs::read(&external).unwrap(), b"payload");
}

#[test]
fn test_huge_prefix_len_still_scans() {
    let dir = tempdir().unwrap();
    write_hello_world(dir.path());

    let mut scanner = Scanner::new();
    scanner.set_prefix_len(usize::MAX);
    let report = scanner.scan(dir.path()).unwrap();

    assert_eq!(report.sets.len(), 1);
    assert_eq!(report.sets.iter().next().unwrap().len(), 3);
}
