use codesweep::output::csv::UTF8_BOM;
use codesweep::output::{CsvOutput, JsonOutput, ManifestWriter, XlsxOutput};
use codesweep::reconcile::{ReconcileConfig, Reconciler, Reconciliation};
use codesweep::sources::derive_root_label;
use std::fs::{self, File};
use std::path::Path;
use tempfile::tempdir;

const GIB: u64 = 1_073_741_824;

fn scan_with_sizes(dir: &Path) -> Reconciliation {
    let root = dir.join("disk");
    fs::create_dir_all(&root).unwrap();
    // Sparse files: the length is what counts.
    File::create(root.join("abc-001 cd1.mp4"))
        .unwrap()
        .set_len(GIB)
        .unwrap();
    File::create(root.join("abc-001 cd2.mp4"))
        .unwrap()
        .set_len(GIB / 2)
        .unwrap();
    File::create(root.join("xyz-002.iso")).unwrap();

    fs::write(dir.join("baseline.txt"), "XYZ-002\n").unwrap();

    Reconciler::new(ReconcileConfig {
        baseline_dir: Some(dir.to_path_buf()),
        baseline_marker: "baseline".to_string(),
        scan_roots: vec![root],
        ..Default::default()
    })
    .run()
}

#[test]
fn test_csv_file_layout() {
    let dir = tempdir().unwrap();
    let result = scan_with_sizes(dir.path());
    let path = dir.path().join("db.csv");
    let root = derive_root_label(&dir.path().join("disk"));

    CsvOutput::new(&result.rows()).write_file(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "\"code\",\"size\",\"source\",\"is_dup\"");
    assert_eq!(lines[1], format!("\"ABC-001\",\"1.5\",\"{root}\",\"0\""));
    let mut labels = vec!["baseline".to_string(), root];
    labels.sort();
    assert_eq!(
        lines[2],
        format!("\"XYZ-002\",\"-\",\"{}\",\"1\"", labels.join(" | "))
    );
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_empty_csv_has_header_only() {
    let output = CsvOutput::new(&[]);
    assert_eq!(
        output.to_string().unwrap(),
        "\"code\",\"size\",\"source\",\"is_dup\"\n"
    );
}

#[test]
fn test_xlsx_from_same_rows() {
    let dir = tempdir().unwrap();
    let result = scan_with_sizes(dir.path());
    let path = dir.path().join("summary.xlsx");

    XlsxOutput::new(&result.rows()).write_file(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_derived_manifests_written_and_reread() {
    let dir = tempdir().unwrap();
    let result = scan_with_sizes(dir.path());
    let out = dir.path().join("out");
    let writer = ManifestWriter::new(&out);

    let written: Vec<_> = result
        .derived
        .iter()
        .map(|manifest| writer.write(manifest).unwrap())
        .collect();

    assert_eq!(written.len(), 1);
    let bytes = fs::read(&written[0]).unwrap();
    assert_eq!(bytes, b"\xEF\xBB\xBFABC-001\nXYZ-002".to_vec());

    // A derived manifest is a valid manifest input for the next run.
    let again = Reconciler::new(ReconcileConfig::default()).compare(&written);
    assert_eq!(again.registry.len(), 2);
}

#[test]
fn test_json_document() {
    let dir = tempdir().unwrap();
    let result = scan_with_sizes(dir.path());

    let json = JsonOutput::new(&result).to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["codes"][0]["code"], "ABC-001");
    assert_eq!(value["codes"][0]["size_bytes"], GIB + GIB / 2);
    assert_eq!(value["codes"][0]["size_gib"], 1.5);
    assert_eq!(value["codes"][1]["duplicate"], true);
    assert_eq!(value["summary"]["policy"]["policy"], "baseline");
    assert_eq!(value["summary"]["policy"]["baseline"], "baseline");
    assert_eq!(value["summary"]["exit_code"], 0);
}
