use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tempfile::tempdir;

use disk_scout_core::dupes::{find_duplicates, spawn_find_duplicates, DupeOptions};
use disk_scout_core::hasher;
use disk_scout_core::messages::DupeMessage;
use disk_scout_core::model::{CandidateFile, DuplicateGroup};
use disk_scout_core::{CancelToken, Error};

fn candidate(path: PathBuf) -> CandidateFile {
    let size = fs::metadata(&path).unwrap().len();
    CandidateFile { path, size }
}

fn write_file(dir: &Path, name: &str, content: &[u8]) -> CandidateFile {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    candidate(path)
}

fn run(files: Vec<CandidateFile>, options: DupeOptions) -> Vec<DuplicateGroup> {
    let (tx, _rx) = mpsc::channel();
    find_duplicates(files, &options, &tx, &CancelToken::new()).unwrap()
}

/// Everything-in options so small fixtures are not filtered away.
fn wide_open() -> DupeOptions {
    DupeOptions {
        min_size: 1,
        max_size: u64::MAX,
    }
}

#[test]
fn test_same_size_different_content_is_not_a_duplicate() {
    let tmp = tempdir().unwrap();

    // a and b identical, c same length but different content
    let a = write_file(tmp.path(), "a.txt", &[b'x'; 1000]);
    let b = write_file(tmp.path(), "b.txt", &[b'x'; 1000]);
    let c = write_file(tmp.path(), "c.txt", &[b'y'; 1000]);

    let groups = run(vec![a, b, c], wide_open());

    assert_eq!(groups.len(), 1, "expected exactly one duplicate group");
    let group = &groups[0];
    assert_eq!(group.size, 1000);
    assert_eq!(group.files.len(), 2);
    assert!(group.files[0].path.ends_with("a.txt"));
    assert!(group.files[1].path.ends_with("b.txt"));
}

#[test]
fn test_unique_sizes_produce_no_groups() {
    let tmp = tempdir().unwrap();
    let a = write_file(tmp.path(), "a.bin", &[0u8; 10]);
    let b = write_file(tmp.path(), "b.bin", &[0u8; 20]);
    let c = write_file(tmp.path(), "c.bin", &[0u8; 30]);

    assert!(run(vec![a, b, c], wide_open()).is_empty());
}

#[test]
fn test_full_hash_separates_files_identical_in_prefix() {
    let tmp = tempdir().unwrap();

    // Identical through the 64 KiB partial-hash prefix, then one byte apart
    let mut content_a = vec![0xABu8; 80 * 1024];
    let content_b = content_a.clone();
    content_a[70_000] = 0x00;

    let a = write_file(tmp.path(), "a.bin", &content_a);
    let b = write_file(tmp.path(), "b.bin", &content_b);

    let groups = run(vec![a, b], wide_open());
    assert!(
        groups.is_empty(),
        "phase 3 must separate files that only differ past the prefix"
    );
}

#[test]
fn test_identical_large_files_survive_all_phases() {
    let tmp = tempdir().unwrap();

    let content = vec![0xCDu8; 80 * 1024];
    let a = write_file(tmp.path(), "a.bin", &content);
    let b = write_file(tmp.path(), "b.bin", &content);
    let c = write_file(tmp.path(), "c.bin", &content);

    let groups = run(vec![a, b, c], wide_open());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 3);
}

#[test]
fn test_group_hash_round_trips() {
    let tmp = tempdir().unwrap();
    let content = b"round trip me".repeat(100);
    let a = write_file(tmp.path(), "a.dat", &content);
    let b = write_file(tmp.path(), "b.dat", &content);

    let groups = run(vec![a, b], wide_open());
    assert_eq!(groups.len(), 1);
    let group = &groups[0];

    // Independently re-hashing every member reproduces the group key
    for member in &group.files {
        let digest = hasher::full_hash(&member.path).unwrap();
        assert_eq!(digest.to_hex().to_string(), group.hash);
        assert_eq!(fs::metadata(&member.path).unwrap().len(), group.size);
    }
}

#[test]
fn test_groups_ordered_by_reclaimable_space() {
    let tmp = tempdir().unwrap();

    // Group 1: two files of 100 bytes → 100 reclaimable
    let small = vec![1u8; 100];
    let a = write_file(tmp.path(), "s1", &small);
    let b = write_file(tmp.path(), "s2", &small);

    // Group 2: three files of 500 bytes → 1000 reclaimable
    let large = vec![2u8; 500];
    let c = write_file(tmp.path(), "l1", &large);
    let d = write_file(tmp.path(), "l2", &large);
    let e = write_file(tmp.path(), "l3", &large);

    let groups = run(vec![a, b, c, d, e], wide_open());
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].reclaimable_bytes(), 1000);
    assert_eq!(groups[1].reclaimable_bytes(), 100);
}

#[test]
fn test_size_window_and_zero_byte_filtering() {
    let tmp = tempdir().unwrap();

    let empty_a = write_file(tmp.path(), "e1", b"");
    let empty_b = write_file(tmp.path(), "e2", b"");
    let tiny_a = write_file(tmp.path(), "t1", &[0u8; 10]);
    let tiny_b = write_file(tmp.path(), "t2", &[0u8; 10]);
    let big_a = write_file(tmp.path(), "b1", &[0u8; 5000]);
    let big_b = write_file(tmp.path(), "b2", &[0u8; 5000]);

    let options = DupeOptions {
        min_size: 100,
        max_size: 4000,
    };
    let groups = run(
        vec![empty_a, empty_b, tiny_a, tiny_b, big_a, big_b],
        options,
    );

    // Zero-byte pairs, under-min pairs and over-max pairs are all excluded
    assert!(groups.is_empty());
}

#[test]
fn test_unreadable_candidate_silently_leaves_its_group() {
    let tmp = tempdir().unwrap();
    let content = vec![7u8; 2000];
    let a = write_file(tmp.path(), "a.bin", &content);
    let b = write_file(tmp.path(), "b.bin", &content);

    // Same claimed size, but the file is gone by hashing time
    let ghost = CandidateFile {
        path: tmp.path().join("ghost.bin"),
        size: 2000,
    };

    let groups = run(vec![a, b, ghost], wide_open());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2, "ghost must not appear in a group");
}

#[test]
fn test_member_order_is_input_order() {
    let tmp = tempdir().unwrap();
    let content = vec![9u8; 1500];
    let z = write_file(tmp.path(), "z-last-alphabetically.bin", &content);
    let a = write_file(tmp.path(), "a-first-alphabetically.bin", &content);

    // z supplied first, so z leads the group regardless of name or hash
    let groups = run(vec![z, a], wide_open());
    assert!(groups[0].files[0].path.ends_with("z-last-alphabetically.bin"));
    assert!(groups[0].files[1].path.ends_with("a-first-alphabetically.bin"));
}

#[test]
fn test_pre_cancelled_run_yields_no_result() {
    let tmp = tempdir().unwrap();
    let content = vec![3u8; 1000];
    let a = write_file(tmp.path(), "a", &content);
    let b = write_file(tmp.path(), "b", &content);

    let cancel = CancelToken::new();
    cancel.cancel();

    let (tx, rx) = mpsc::channel();
    let result = find_duplicates(vec![a, b], &wide_open(), &tx, &cancel);
    assert!(matches!(result, Err(Error::Cancelled)));
    drop(tx);
    assert!(
        rx.iter().next().is_none(),
        "cancelled run must not emit messages"
    );
}

#[test]
fn test_worker_ends_with_complete() {
    let tmp = tempdir().unwrap();
    let content = vec![5u8; 3000];
    let a = write_file(tmp.path(), "a", &content);
    let b = write_file(tmp.path(), "b", &content);

    let handle = spawn_find_duplicates(vec![a, b], wide_open());
    let messages: Vec<DupeMessage> = handle.receiver().iter().collect();

    match messages.last().expect("worker sent nothing") {
        DupeMessage::Complete(groups) => {
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].size, 3000);
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}
