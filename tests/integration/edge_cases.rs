use codesweep::codes::normalize;
use codesweep::error::ExitCode;
use codesweep::reconcile::{ReconcileConfig, Reconciler};
use codesweep::sources::{ScanOptions, SourceReader};
use codesweep::sources::FilesystemScanner;
use std::fs::{self, File};
use tempfile::tempdir;

#[test]
fn test_zero_padding_stays_distinct() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "ABC-1 is short\n").unwrap();
    fs::write(&b, "ABC-001\n").unwrap();

    // ABC-1 has a single digit and matches nothing; ABC-01 and ABC-001 differ.
    let result = Reconciler::new(ReconcileConfig::default()).compare(&[a, b]);
    assert_eq!(result.registry.len(), 1);
    assert_ne!(normalize("ABC-01"), normalize("ABC-001"));
}

#[test]
fn test_manifest_without_codes() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("notes.txt");
    fs::write(&a, "nothing to see\n中文无码\nA-1\n").unwrap();

    let result = Reconciler::new(ReconcileConfig::default()).compare(&[a]);
    assert!(result.registry.is_empty());
    assert_eq!(result.summary.manifests_read, 1);
    assert_eq!(result.exit_code(), ExitCode::NoCodes);
}

#[test]
fn test_empty_manifest() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("empty.txt");
    File::create(&a).unwrap();

    let result = Reconciler::new(ReconcileConfig::default()).compare(&[a]);
    assert!(result.registry.is_empty());
    assert_eq!(result.summary.sources_failed, 0);
}

#[test]
fn test_cjk_between_letters_and_digits() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("abc中文123.mp4")).unwrap();
    File::create(dir.path().join("中文xyz-002中文.mkv")).unwrap();

    let batch = FilesystemScanner::new(dir.path(), ScanOptions::default())
        .read()
        .unwrap();
    let codes: Vec<String> = batch
        .distinct_codes()
        .into_iter()
        .map(|code| code.into_string())
        .collect();

    // The CJK run becomes a separator, so "abc 123" has no code.
    assert_eq!(codes, vec!["XYZ-002"]);
}

#[test]
fn test_uppercase_extension_is_media() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("ABC-001.MP4")).unwrap();
    File::create(dir.path().join("XYZ-002.Mkv")).unwrap();

    let batch = FilesystemScanner::new(dir.path(), ScanOptions::default())
        .read()
        .unwrap();
    assert_eq!(batch.distinct_codes().len(), 2);
}

#[test]
fn test_directory_named_like_media_is_ignored() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("abc-001.mp4")).unwrap();

    let batch = FilesystemScanner::new(dir.path(), ScanOptions::default())
        .read()
        .unwrap();
    assert!(batch.observations.is_empty());
}

#[test]
fn test_two_roots_with_same_label_merge() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    File::create(a.join("abc-001.mp4")).unwrap().set_len(3).unwrap();
    File::create(b.join("abc-001.mkv")).unwrap().set_len(4).unwrap();
    File::create(b.join("bbb-002.mp4")).unwrap().set_len(1).unwrap();

    let result = Reconciler::new(ReconcileConfig {
        scan_roots: vec![a, b],
        ..Default::default()
    })
    .run();

    let entry = result.registry.get(&normalize("ABC-001").unwrap()).unwrap();
    assert_eq!(entry.labels().len(), 1);
    assert_eq!(entry.aggregate_size_bytes(), 7);
    assert_eq!(result.summary.roots_scanned, 2);

    // One code list per label, holding every root's codes.
    assert_eq!(result.derived.len(), 1);
    let listed: Vec<&str> = result.derived[0].codes.iter().map(|c| c.as_str()).collect();
    assert_eq!(listed, vec!["ABC-001", "BBB-002"]);
}
