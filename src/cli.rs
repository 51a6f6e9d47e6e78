//! Command-line interface definitions for codesweep.
//!
//! Global options (verbosity, config file, error format) apply to every
//! subcommand. Options given on the command line override the config file
//! and `CODESWEEP_*` environment variables.
//!
//! # Example
//!
//! ```bash
//! # Reconcile the configured roots and manifests
//! codesweep scan
//!
//! # Walk two drives, read manifests from ./incoming, write reports to ./out
//! codesweep scan "E:\Media\#Sorted" /mnt/archive --manifests incoming --out out
//!
//! # Which codes appear in more than one list?
//! codesweep compare a.txt b.txt
//!
//! # What code does a file name carry?
//! codesweep extract "[HD] abc123 trailer.mp4"
//!
//! # Which settings are in effect?
//! codesweep config
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Catalog media codes across drives and lists, and flag what is already owned.
///
/// codesweep extracts identifier codes from file names and plain-text lists,
/// merges them into one registry and writes a CSV/XLSX report plus one
/// sorted code list per source.
#[derive(Debug, Parser)]
#[command(name = "codesweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: platform config dir, config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile baseline manifests, external manifests and filesystem roots
    Scan(ScanArgs),
    /// Compare manifests with each other; codes in two or more are duplicates
    Compare(CompareArgs),
    /// Print the canonical code found in each argument
    Extract(ExtractArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Report options shared by `scan` and `compare`.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Directory receiving the CSV, the spreadsheet and derived manifests
    #[arg(long = "out", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Do not write the spreadsheet
    #[arg(long)]
    pub no_xlsx: bool,

    /// Summary format on stdout
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Filesystem roots to walk (replaces the configured roots)
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Directory of external manifests
    #[arg(long = "manifests", value_name = "DIR")]
    pub manifest_dir: Option<PathBuf>,

    /// Directory searched for baseline manifests
    #[arg(long, value_name = "DIR")]
    pub baseline_dir: Option<PathBuf>,

    /// Substring identifying baseline manifests
    #[arg(long = "marker", value_name = "TEXT")]
    pub baseline_marker: Option<String>,

    /// Media file extension (can be specified multiple times)
    #[arg(long = "ext", value_name = "EXT")]
    pub media_extensions: Vec<String>,

    /// Glob patterns to ignore while walking (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during the walk
    #[arg(long, overrides_with = "no_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Do not follow symbolic links (overrides config)
    #[arg(long, overrides_with = "follow_symlinks")]
    pub no_follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Take every code on a manifest line, not only the first
    #[arg(long)]
    pub all_matches: bool,

    /// Do not write per-source code lists
    #[arg(long)]
    pub no_manifests: bool,

    /// Commit and push the CSV with git in the output directory
    #[arg(long)]
    pub push: bool,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Arguments for the compare subcommand.
#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    /// Manifests to compare (default: every manifest in the current directory)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Take every code on a line, not only the first
    #[arg(long)]
    pub all_matches: bool,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Arguments for the extract subcommand.
#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// File names or text lines
    #[arg(value_name = "TEXT", required = true)]
    pub inputs: Vec<String>,

    /// Print every code in each input, not only the first
    #[arg(long)]
    pub all: bool,
}

/// Summary format on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON document with every code and the run summary
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
