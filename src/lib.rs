//! codesweep - media code inventory reconciliation
//!
//! Extracts identifier codes (`ABC-001`) from media file names and
//! plain-text manifests, merges them into one registry keyed by code, flags
//! codes that are already present in a baseline list, and writes a CSV and
//! spreadsheet report plus one sorted code list per source.
//!
//! The library entry point for a full run is [`reconcile::Reconciler`];
//! [`run_app`] drives it from parsed command-line arguments.

pub mod cli;
pub mod codes;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod reconcile;
pub mod registry;
pub mod sources;
pub mod sync;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, CompareArgs, ExtractArgs, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, ManifestWriter, XlsxOutput};
use crate::progress::Progress;
use crate::reconcile::{Reconciler, Reconciliation};
use crate::sources::manifest::list_manifests;

/// Run the application for parsed arguments.
///
/// # Errors
///
/// Returns an error when the configuration is invalid or the CSV report
/// cannot be written. Unreadable sources are skipped, not errors.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if let Commands::Extract(ref args) = cli.command {
        return run_extract(args);
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(ref args) => {
            config.merge_scan_args(args);
            let format = args.report.output;
            let reconciler = build_reconciler(&config, cli.quiet, format)?;
            let result = reconciler.run();
            finish_run(&config, &result, format, true)
        }
        Commands::Compare(ref args) => {
            config.merge_compare_args(args);
            run_compare(&config, args, cli.quiet)
        }
        Commands::Config => {
            let text = config.to_toml().context("Failed to render configuration")?;
            let path = cli
                .config
                .clone()
                .or_else(Config::default_path)
                .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
            println!("# config file: {path}");
            print!("{text}");
            Ok(ExitCode::Success)
        }
        Commands::Extract(_) => Ok(ExitCode::Success),
    }
}

fn build_reconciler(config: &Config, quiet: bool, format: OutputFormat) -> Result<Reconciler> {
    let reconcile = config
        .reconcile_config()
        .context("Invalid encoding configuration")?;
    let mut reconciler = Reconciler::new(reconcile);
    // Keep stdout clean for JSON consumers.
    if !quiet && format == OutputFormat::Text {
        reconciler = reconciler.with_progress(Arc::new(Progress::new(false)));
    }
    Ok(reconciler)
}

fn run_compare(config: &Config, args: &CompareArgs, quiet: bool) -> Result<ExitCode> {
    let format = args.report.output;
    let files = if args.files.is_empty() {
        let cwd = Path::new(".");
        list_manifests(
            cwd,
            &config.manifest_extensions(),
            config.exclude_marker.as_deref(),
        )
        .context("Failed to list manifests in the current directory")?
    } else {
        args.files.clone()
    };

    if files.is_empty() {
        log::warn!("No manifests to compare");
    } else {
        log::info!("Comparing {} manifests", files.len());
    }

    let result = build_reconciler(config, quiet, format)?.compare(&files);
    finish_run(config, &result, format, false)
}

/// Write reports, optionally derived manifests and the push, then print the summary.
fn finish_run(
    config: &Config,
    result: &Reconciliation,
    format: OutputFormat,
    full_run: bool,
) -> Result<ExitCode> {
    let csv_path = write_reports(config, result)?;

    if full_run && config.report.write_manifests {
        write_derived_manifests(&config.output_dir, result);
    }

    if full_run && config.report.push {
        if let Err(e) = sync::push_report(&config.output_dir, &csv_path) {
            log::warn!("Push skipped: {}", e);
        }
    }

    log_summary(result, &csv_path);
    let stdout = io::stdout();
    match format {
        OutputFormat::Json => JsonOutput::new(result)
            .write_to(stdout.lock())
            .context("Failed to write JSON output")?,
        OutputFormat::Text => {
            print_text_summary(stdout.lock(), result, &csv_path).context("Failed to write summary")?
        }
    }

    Ok(result.exit_code())
}

/// Write the CSV, then the spreadsheet. Only the CSV is required.
fn write_reports(config: &Config, result: &Reconciliation) -> Result<PathBuf> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let rows = result.rows();
    let csv_path = config.csv_path();
    CsvOutput::new(&rows)
        .write_file(&csv_path)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;
    log::info!("Wrote {} rows to {}", rows.len(), csv_path.display());

    if config.report.write_xlsx {
        let xlsx_path = config.xlsx_path();
        match XlsxOutput::new(&rows).write_file(&xlsx_path) {
            Ok(()) => log::info!("Wrote {}", xlsx_path.display()),
            Err(e) => log::warn!(
                "Spreadsheet not written ({}); {} is still available",
                e,
                csv_path.display()
            ),
        }
    }

    Ok(csv_path)
}

fn write_derived_manifests(dir: &Path, result: &Reconciliation) {
    let writer = ManifestWriter::new(dir);
    for manifest in &result.derived {
        if let Err(e) = writer.write(manifest) {
            log::warn!("Failed to write code list for {}: {}", manifest.label, e);
        }
    }
}

fn log_summary(result: &Reconciliation, csv_path: &Path) {
    let summary = &result.summary;
    log::info!(
        "Run complete in {:.2?}: {} manifests, {} roots, {} codes, {} duplicates, {} total",
        summary.duration,
        summary.manifests_read,
        summary.roots_scanned,
        summary.distinct_codes,
        summary.duplicates,
        summary.total_size_display()
    );
    if summary.is_partial() {
        log::warn!(
            "{} sources failed and {} items were skipped; {} may be incomplete",
            summary.sources_failed,
            summary.items_skipped,
            csv_path.display()
        );
    }
}

fn print_text_summary<W: Write>(
    mut out: W,
    result: &Reconciliation,
    csv_path: &Path,
) -> io::Result<()> {
    let summary = &result.summary;
    if result.registry.is_empty() {
        writeln!(out, "No codes found.")?;
        return Ok(());
    }
    writeln!(
        out,
        "Sources:    {} manifests, {} roots",
        summary.manifests_read, summary.roots_scanned
    )?;
    if let Some(ref baseline) = summary.baseline {
        writeln!(out, "Baseline:   {baseline}")?;
    }
    writeln!(
        out,
        "Codes:      {} ({} duplicates)",
        summary.distinct_codes, summary.duplicates
    )?;
    writeln!(out, "Total size: {}", summary.total_size_display())?;
    if summary.is_partial() {
        writeln!(
            out,
            "Skipped:    {} sources, {} items",
            summary.sources_failed, summary.items_skipped
        )?;
    }
    writeln!(out, "Report:     {}", csv_path.display())?;
    Ok(())
}

fn run_extract(args: &ExtractArgs) -> Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut found = false;
    for input in &args.inputs {
        let codes = if args.all {
            codes::normalize_all(input)
        } else {
            codes::normalize(input).into_iter().collect()
        };
        found |= !codes.is_empty();
        let line = codes
            .iter()
            .map(codes::CanonicalCode::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{line}").context("Failed to write output")?;
    }
    Ok(if found {
        ExitCode::Success
    } else {
        ExitCode::NoCodes
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ReconcileConfig;
    use tempfile::TempDir;

    fn compared(dir: &Path) -> Reconciliation {
        let a = dir.join("a.txt");
        let b = dir.join("b.txt");
        fs::write(&a, "ABC-001\n").unwrap();
        fs::write(&b, "abc001\nXYZ-002\n").unwrap();
        Reconciler::new(ReconcileConfig::default()).compare(&[a, b])
    }

    #[test]
    fn test_text_summary() {
        let dir = TempDir::new().unwrap();
        let result = compared(dir.path());
        let mut out = Vec::new();
        print_text_summary(&mut out, &result, Path::new("db.csv")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Codes:      2 (1 duplicates)"), "{text}");
        assert!(text.contains("Report:     db.csv"));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn test_text_summary_empty() {
        let result = Reconciler::new(ReconcileConfig::default()).compare(&[]);
        let mut out = Vec::new();
        print_text_summary(&mut out, &result, Path::new("db.csv")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No codes found.\n");
    }

    #[test]
    fn test_write_reports_without_xlsx() {
        let dir = TempDir::new().unwrap();
        let result = compared(dir.path());
        let mut config = Config {
            output_dir: dir.path().join("out"),
            ..Config::default()
        };
        config.report.write_xlsx = false;

        let csv_path = write_reports(&config, &result).unwrap();

        assert_eq!(csv_path, dir.path().join("out").join("db.csv"));
        assert!(csv_path.exists());
        assert!(!config.xlsx_path().exists());
    }
}
