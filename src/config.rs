//! Application configuration.
//!
//! Settings are layered with `figment`, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file (`--config PATH`, else `config.toml` in the platform config dir)
//! 3. Environment variables prefixed `CODESWEEP_` (`__` separates nested keys,
//!    e.g. `CODESWEEP_REPORT__WRITE_XLSX=false`)
//! 4. Command-line flags ([`Config::merge_scan_args`], [`Config::merge_compare_args`])
//!
//! # Example file
//!
//! ```toml
//! scan_roots = ['E:\Media\#Sorted', '/mnt/archive']
//! manifest_dir = "incoming"
//! baseline_marker = "history"
//! encodings = ["utf-8-sig", "gbk"]
//!
//! [report]
//! write_xlsx = false
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{CompareArgs, ReportArgs, ScanArgs};
use crate::reconcile::ReconcileConfig;
use crate::sources::decode::DEFAULT_ENCODINGS;
use crate::sources::walker::{normalize_extensions, DEFAULT_MEDIA_EXTENSIONS};
use crate::sources::{DecodeError, EncodingChain, ManifestOptions, ScanOptions};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "CODESWEEP_";

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The encoding list names an unknown encoding.
    #[error(transparent)]
    Encoding(#[from] DecodeError),
}

/// Report settings (`[report]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// CSV file name inside the output directory.
    pub csv_name: String,
    /// Spreadsheet file name inside the output directory.
    pub xlsx_name: String,
    /// Write the spreadsheet next to the CSV.
    pub write_xlsx: bool,
    /// Write one code list per external manifest and root.
    pub write_manifests: bool,
    /// Commit and push the CSV after a scan.
    pub push: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            csv_name: "db.csv".to_string(),
            xlsx_name: "summary.xlsx".to_string(),
            write_xlsx: true,
            write_manifests: true,
            push: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filesystem roots to walk.
    pub scan_roots: Vec<PathBuf>,
    /// Directory searched for baseline manifests.
    pub baseline_dir: PathBuf,
    /// Directory of external manifests.
    pub manifest_dir: PathBuf,
    /// Directory receiving reports and derived manifests.
    pub output_dir: PathBuf,
    /// Substring identifying baseline manifests. Empty disables the baseline.
    pub baseline_marker: String,
    /// Manifests whose name contains this are never read.
    pub exclude_marker: Option<String>,
    /// Media file extensions recognized while walking.
    pub media_extensions: Vec<String>,
    /// Extensions of manifest files.
    pub manifest_extensions: Vec<String>,
    /// Encodings tried in order when decoding manifests.
    pub encodings: Vec<String>,
    /// Take every code on a manifest line instead of only the first.
    pub all_matches_per_line: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style patterns excluded from walks.
    pub ignore_patterns: Vec<String>,
    /// Report settings.
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_roots: Vec::new(),
            baseline_dir: PathBuf::from("."),
            manifest_dir: PathBuf::from("incoming"),
            output_dir: PathBuf::from("."),
            baseline_marker: "baseline".to_string(),
            exclude_marker: Some("result".to_string()),
            media_extensions: to_strings(DEFAULT_MEDIA_EXTENSIONS),
            manifest_extensions: vec!["txt".to_string()],
            encodings: to_strings(DEFAULT_ENCODINGS),
            all_matches_per_line: false,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            report: ReportConfig::default(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Config {
    /// Load the configuration.
    ///
    /// With `explicit`, that file must exist. Without it, the platform
    /// config file is used when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit file is missing or a layer
    /// cannot be parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.is_file() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::load_from_path(path),
            None => match Self::default_path() {
                Some(path) => Self::load_from_path(&path),
                None => {
                    log::debug!("No platform config directory, using defaults");
                    Self::extract(Self::figment())
                }
            },
        }
    }

    /// Load defaults, then `path` if it exists, then the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a layer cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if path.is_file() {
            log::debug!("Loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        Self::extract(figment.merge(Self::env()))
    }

    /// Render the configuration as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Platform-specific path of the config file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "codesweep", "codesweep")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Self::env())
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Apply `scan` flags.
    pub fn merge_scan_args(&mut self, args: &ScanArgs) {
        if !args.roots.is_empty() {
            self.scan_roots.clone_from(&args.roots);
        }
        if let Some(ref dir) = args.manifest_dir {
            self.manifest_dir.clone_from(dir);
        }
        if let Some(ref dir) = args.baseline_dir {
            self.baseline_dir.clone_from(dir);
        }
        if let Some(ref marker) = args.baseline_marker {
            self.baseline_marker.clone_from(marker);
        }
        if !args.media_extensions.is_empty() {
            self.media_extensions.clone_from(&args.media_extensions);
        }
        self.ignore_patterns
            .extend(args.ignore_patterns.iter().cloned());
        if args.follow_symlinks {
            self.follow_symlinks = true;
        }
        if args.no_follow_symlinks {
            self.follow_symlinks = false;
        }
        if args.skip_hidden {
            self.skip_hidden = true;
        }
        if args.all_matches {
            self.all_matches_per_line = true;
        }
        if args.no_manifests {
            self.report.write_manifests = false;
        }
        if args.push {
            self.report.push = true;
        }
        self.merge_report_args(&args.report);
    }

    /// Apply `compare` flags.
    pub fn merge_compare_args(&mut self, args: &CompareArgs) {
        if args.all_matches {
            self.all_matches_per_line = true;
        }
        self.merge_report_args(&args.report);
    }

    fn merge_report_args(&mut self, args: &ReportArgs) {
        if let Some(ref dir) = args.output_dir {
            self.output_dir.clone_from(dir);
        }
        if args.no_xlsx {
            self.report.write_xlsx = false;
        }
    }

    /// Manifest extensions, lowercase without dots.
    #[must_use]
    pub fn manifest_extensions(&self) -> Vec<String> {
        normalize_extensions(&self.manifest_extensions)
    }

    /// Options for reading manifests.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if an encoding label is unknown.
    pub fn manifest_options(&self) -> Result<ManifestOptions, DecodeError> {
        Ok(ManifestOptions {
            encodings: EncodingChain::from_labels(&self.encodings)?,
            all_matches_per_line: self.all_matches_per_line,
        })
    }

    /// Options for walking roots.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            ignore_patterns: self.ignore_patterns.clone(),
            ..ScanOptions::default()
        }
        .with_media_extensions(&self.media_extensions)
    }

    /// Everything a reconciliation run needs.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if an encoding label is unknown.
    pub fn reconcile_config(&self) -> Result<ReconcileConfig, DecodeError> {
        Ok(ReconcileConfig {
            baseline_dir: Some(self.baseline_dir.clone()),
            baseline_marker: self.baseline_marker.clone(),
            manifest_dir: Some(self.manifest_dir.clone()),
            scan_roots: self.scan_roots.clone(),
            manifest_extensions: self.manifest_extensions(),
            exclude_marker: self.exclude_marker.clone().filter(|m| !m.is_empty()),
            manifest: self.manifest_options()?,
            scan: self.scan_options(),
        })
    }

    /// Path of the CSV report.
    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.report.csv_name)
    }

    /// Path of the spreadsheet report.
    #[must_use]
    pub fn xlsx_path(&self) -> PathBuf {
        self.output_dir.join(&self.report.xlsx_name)
    }
}
