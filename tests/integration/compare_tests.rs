use codesweep::codes::normalize;
use codesweep::error::ExitCode;
use codesweep::reconcile::{ReconcileConfig, Reconciler};
use codesweep::registry::DuplicatePolicy;
use codesweep::sources::ManifestOptions;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_compare_flags_any_overlap() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("alice.txt");
    let b = dir.path().join("bob.txt");
    let c = dir.path().join("carol.txt");
    fs::write(&a, "ABC-001\nXYZ-002\n").unwrap();
    fs::write(&b, "xyz002 again\n").unwrap();
    fs::write(&c, "QQQ-777\n").unwrap();

    let result = Reconciler::new(ReconcileConfig::default()).compare(&[a, b, c]);

    assert_eq!(result.classifier.policy(), &DuplicatePolicy::MultiSource);
    let rows = result.rows();
    let flagged: Vec<&str> = rows
        .iter()
        .filter(|row| row.is_duplicate())
        .map(|row| row.code.as_str())
        .collect();
    assert_eq!(flagged, vec!["XYZ-002"]);
    assert!(result.derived.is_empty());
}

#[test]
fn test_compare_all_matches_per_line() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "ABC-001 XYZ-002\n").unwrap();
    fs::write(&b, "XYZ-002\n").unwrap();

    let first_only = Reconciler::new(ReconcileConfig::default()).compare(&[a.clone(), b.clone()]);
    assert_eq!(first_only.summary.duplicates, 0);

    let config = ReconcileConfig {
        manifest: ManifestOptions {
            all_matches_per_line: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let all = Reconciler::new(config).compare(&[a, b]);
    assert_eq!(all.registry.len(), 2);
    assert_eq!(all.summary.duplicates, 1);
    assert!(all
        .registry
        .get(&normalize("XYZ-002").unwrap())
        .unwrap()
        .has_label("a"));
}

#[test]
fn test_compare_nothing() {
    let result = Reconciler::new(ReconcileConfig::default()).compare(&[]);
    assert!(result.registry.is_empty());
    assert_eq!(result.exit_code(), ExitCode::NoCodes);
}

#[test]
fn test_compare_gbk_and_utf16_lists() {
    let dir = tempdir().unwrap();
    let gbk = dir.path().join("gbk.txt");
    let utf16 = dir.path().join("utf16.txt");

    // "中文 ABC-001" in GBK.
    let mut bytes = vec![0xD6, 0xD0, 0xCE, 0xC4];
    bytes.extend_from_slice(b" ABC-001\r\n");
    fs::write(&gbk, bytes).unwrap();

    let mut wide = vec![0xFF, 0xFE];
    for unit in "abc001\n".encode_utf16() {
        wide.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&utf16, wide).unwrap();

    let result = Reconciler::new(ReconcileConfig::default()).compare(&[gbk, utf16]);

    assert_eq!(result.registry.len(), 1);
    assert_eq!(result.summary.duplicates, 1);
}
