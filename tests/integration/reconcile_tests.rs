use codesweep::codes::normalize;
use codesweep::error::ExitCode;
use codesweep::reconcile::{ReconcileConfig, Reconciler};
use codesweep::sources::derive_root_label;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_sized(path: &Path, len: usize) {
    File::create(path)
        .unwrap()
        .write_all(&vec![0u8; len])
        .unwrap();
}

#[test]
fn test_baseline_and_scan_end_to_end() {
    let dir = tempdir().unwrap();
    let lists = dir.path().join("lists");
    let root = dir.path().join("disk");
    fs::create_dir_all(&lists).unwrap();
    fs::create_dir_all(&root).unwrap();

    fs::write(lists.join("baseline.txt"), "foo ABC-001 bar\n").unwrap();
    write_sized(&root.join("abc-001.mp4"), 10);
    write_sized(&root.join("xyz-002.avi"), 20);

    let config = ReconcileConfig {
        baseline_dir: Some(lists.clone()),
        baseline_marker: "baseline".to_string(),
        scan_roots: vec![root.clone()],
        ..Default::default()
    };
    let result = Reconciler::new(config).run();
    let root_label = derive_root_label(&root);

    let abc = result.registry.get(&normalize("ABC-001").unwrap()).unwrap();
    assert!(abc.has_label("baseline"));
    assert!(abc.has_label(&root_label));
    assert_eq!(abc.labels().len(), 2);
    assert_eq!(abc.aggregate_size_bytes(), 10);

    let xyz = result.registry.get(&normalize("XYZ-002").unwrap()).unwrap();
    assert_eq!(xyz.labels().len(), 1);
    assert!(xyz.has_label(&root_label));

    let rows = result.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].code, "ABC-001");
    assert_eq!(rows[0].size, "-");
    assert_eq!(rows[0].is_dup, 1);
    assert_eq!(rows[1].code, "XYZ-002");
    assert_eq!(rows[1].is_dup, 0);

    assert_eq!(result.summary.baseline.as_deref(), Some("baseline"));
    assert_eq!(result.summary.duplicates, 1);
    assert_eq!(result.exit_code(), ExitCode::Success);
}

#[test]
fn test_derived_manifests_for_external_and_roots_only() {
    let dir = tempdir().unwrap();
    let incoming = dir.path().join("incoming");
    let root = dir.path().join("disk");
    fs::create_dir_all(&incoming).unwrap();
    fs::create_dir_all(root.join("nested")).unwrap();

    fs::write(dir.path().join("baseline 500.txt"), "ABC-001\n").unwrap();
    fs::write(incoming.join("friend.txt"), "zzz-999 title\nABC-001\n").unwrap();
    write_sized(&root.join("nested").join("[HD] mid-100.mkv"), 5);
    write_sized(&root.join("notes.txt"), 5);

    let config = ReconcileConfig {
        baseline_dir: Some(dir.path().to_path_buf()),
        baseline_marker: "baseline".to_string(),
        manifest_dir: Some(incoming),
        scan_roots: vec![root.clone()],
        ..Default::default()
    };
    let result = Reconciler::new(config).run();

    assert_eq!(result.derived.len(), 2);
    let codes_for = |label: &str| -> Vec<&str> {
        result
            .derived
            .iter()
            .find(|d| d.label == label)
            .map(|d| d.codes.iter().map(|c| c.as_str()).collect())
            .unwrap_or_default()
    };
    assert_eq!(codes_for("friend"), vec!["ABC-001", "ZZZ-999"]);
    assert_eq!(codes_for(&derive_root_label(&root)), vec!["MID-100"]);

    assert_eq!(result.summary.manifests_read, 2);
    assert_eq!(result.summary.roots_scanned, 1);
    // ABC-001 is in the baseline and in friend.txt.
    assert_eq!(result.summary.duplicates, 1);
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = tempdir().unwrap();
    write_sized(&dir.path().join("abc-001.mp4"), 100);
    write_sized(&dir.path().join("ABC001 part2.mp4"), 50);

    let config = ReconcileConfig {
        scan_roots: vec![dir.path().to_path_buf()],
        ..Default::default()
    };
    let first = Reconciler::new(config.clone()).run();
    let second = Reconciler::new(config).run();

    let code = normalize("ABC-001").unwrap();
    let a = first.registry.get(&code).unwrap();
    let b = second.registry.get(&code).unwrap();
    assert_eq!(a.labels(), b.labels());
    assert_eq!(a.aggregate_size_bytes(), 150);
    assert_eq!(b.aggregate_size_bytes(), 150);
}

#[test]
fn test_no_baseline_flags_nothing() {
    let dir = tempdir().unwrap();
    let incoming = dir.path().join("incoming");
    fs::create_dir_all(&incoming).unwrap();
    fs::write(incoming.join("a.txt"), "ABC-001\n").unwrap();
    fs::write(incoming.join("b.txt"), "ABC-001\n").unwrap();

    let config = ReconcileConfig {
        baseline_dir: Some(dir.path().to_path_buf()),
        baseline_marker: "history".to_string(),
        manifest_dir: Some(incoming),
        ..Default::default()
    };
    let result = Reconciler::new(config).run();

    assert!(result.summary.baseline.is_none());
    assert_eq!(result.registry.len(), 1);
    assert_eq!(result.summary.duplicates, 0);
}

#[test]
fn test_exclude_marker_keeps_reports_out() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "ABC-001\n").unwrap();
    fs::write(dir.path().join("compare result.txt"), "XYZ-002\n").unwrap();

    let config = ReconcileConfig {
        manifest_dir: Some(dir.path().to_path_buf()),
        exclude_marker: Some("result".to_string()),
        ..Default::default()
    };
    let result = Reconciler::new(config).run();

    assert_eq!(result.registry.len(), 1);
    assert!(result.registry.get(&normalize("XYZ-002").unwrap()).is_none());
}

#[test]
fn test_missing_manifest_dir_is_not_a_failure() {
    let dir = tempdir().unwrap();
    let config = ReconcileConfig {
        manifest_dir: Some(dir.path().join("absent")),
        ..Default::default()
    };
    let result = Reconciler::new(config).run();
    assert_eq!(result.summary.sources_failed, 0);
    assert_eq!(result.exit_code(), ExitCode::NoCodes);
}
