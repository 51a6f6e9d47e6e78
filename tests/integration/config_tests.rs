use clap::Parser;
use codesweep::cli::{Cli, Commands};
use codesweep::config::{Config, ENV_PREFIX};
use codesweep::reconcile::Reconciler;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with(ENV_PREFIX) {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_config_file_drives_a_run() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let lists = dir.path().join("lists");
    let incoming = dir.path().join("incoming");
    fs::create_dir_all(&lists).unwrap();
    fs::create_dir_all(&incoming).unwrap();
    fs::write(lists.join("history-500.lst"), "ABC-001\n").unwrap();
    fs::write(incoming.join("friend.LST"), "ABC-001\nXYZ-002\n").unwrap();

    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "baseline_dir = {:?}\nmanifest_dir = {:?}\nbaseline_marker = \"history\"\nmanifest_extensions = [\".lst\"]\n",
            lists.to_string_lossy(),
            incoming.to_string_lossy()
        ),
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    let result = Reconciler::new(config.reconcile_config().unwrap()).run();

    assert_eq!(result.summary.baseline.as_deref(), Some("history-500"));
    assert_eq!(result.summary.manifests_read, 2);
    assert_eq!(result.summary.duplicates, 1);
}

#[test]
fn test_cli_overrides_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    std::env::set_var("CODESWEEP_OUTPUT_DIR", "from-env");
    std::env::set_var("CODESWEEP_REPORT__CSV_NAME", "codes.csv");
    let mut config = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();
    clear_env();
    assert_eq!(config.csv_path(), PathBuf::from("from-env").join("codes.csv"));

    let cli = Cli::try_parse_from(["codesweep", "compare", "--out", "from-cli"]).unwrap();
    if let Commands::Compare(args) = &cli.command {
        config.merge_compare_args(args);
    }
    assert_eq!(config.csv_path(), PathBuf::from("from-cli").join("codes.csv"));
}

#[test]
fn test_env_list_values() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    std::env::set_var("CODESWEEP_MEDIA_EXTENSIONS", "[mp4, mkv]");
    let config = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();
    clear_env();

    assert_eq!(config.media_extensions, vec!["mp4", "mkv"]);
}
