//! Reconciliation run: discover sources, merge them, classify.
//!
//! # Overview
//!
//! A run reads, in order:
//! 1. **Baseline manifests** - manifests in the baseline directory whose
//!    name contains the baseline marker; the first (by name) provides the
//!    baseline label
//! 2. **External manifests** - every manifest in the manifest directory
//! 3. **Filesystem roots** - each configured root that exists
//!
//! All observations go into one [`Registry`]. Code lists are collected per
//! label, so sources sharing a label end up in one list. A source that cannot be read
//! is logged, counted and skipped; the run always completes with whatever
//! could be read.
//!
//! # Example
//!
//! ```no_run
//! use codesweep::reconcile::{ReconcileConfig, Reconciler};
//! use std::path::PathBuf;
//!
//! let config = ReconcileConfig {
//!     scan_roots: vec![PathBuf::from("/mnt/media")],
//!     ..Default::default()
//! };
//! let result = Reconciler::new(config).run();
//! println!("{} codes, {} duplicates", result.summary.distinct_codes, result.summary.duplicates);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::codes::CanonicalCode;
use crate::error::ExitCode;
use crate::output::{build_rows, ReportRow};
use crate::progress::{ProgressCallback, PHASE_MANIFESTS};
use crate::registry::{DuplicateClassifier, DuplicatePolicy, Registry};
use crate::sources::manifest::list_manifests;
use crate::sources::{
    DerivedManifest, FilesystemScanner, ManifestOptions, ManifestReader, ScanOptions,
    SourceBatch, SourceError, SourceLabel, SourceReader,
};

/// What a run reads and how.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Directory searched for baseline manifests.
    pub baseline_dir: Option<PathBuf>,
    /// Substring identifying baseline manifests.
    pub baseline_marker: String,
    /// Directory of external manifests.
    pub manifest_dir: Option<PathBuf>,
    /// Filesystem roots to walk.
    pub scan_roots: Vec<PathBuf>,
    /// Extensions of manifest files, lowercase without dot.
    pub manifest_extensions: Vec<String>,
    /// Manifests whose name contains this are never read.
    pub exclude_marker: Option<String>,
    /// Manifest decoding options.
    pub manifest: ManifestOptions,
    /// Filesystem walk options.
    pub scan: ScanOptions,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            baseline_dir: None,
            baseline_marker: String::new(),
            manifest_dir: None,
            scan_roots: Vec::new(),
            manifest_extensions: vec!["txt".to_string()],
            exclude_marker: None,
            manifest: ManifestOptions::default(),
            scan: ScanOptions::default(),
        }
    }
}

/// Statistics of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Manifests read successfully
    pub manifests_read: usize,
    /// Roots walked successfully
    pub roots_scanned: usize,
    /// Whole sources that could not be read
    pub sources_failed: usize,
    /// Items skipped inside sources
    pub items_skipped: usize,
    /// Distinct codes in the registry
    pub distinct_codes: usize,
    /// Codes flagged as duplicates
    pub duplicates: usize,
    /// Sum of aggregate sizes in bytes
    pub total_size: u64,
    /// Baseline label, if one was found
    pub baseline: Option<String>,
    /// Human-readable descriptions of what was skipped
    pub warnings: Vec<String>,
    /// Duration of the run
    #[serde(skip)]
    pub duration: Duration,
}

impl RunSummary {
    /// Whether anything was skipped.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.sources_failed > 0 || self.items_skipped > 0
    }

    /// Total size in human-readable binary units.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }

    fn record_failure(&mut self, what: &str, error: &SourceError) {
        log::warn!("Skipping {}: {}", what, error);
        self.sources_failed += 1;
        self.warnings.push(format!("{what}: {error}"));
    }
}

/// Outcome of a run.
#[derive(Debug)]
pub struct Reconciliation {
    /// Every observed code
    pub registry: Registry,
    /// Classifier configured for the run
    pub classifier: DuplicateClassifier,
    /// Per-label code lists to persist, in label order
    pub derived: Vec<DerivedManifest>,
    /// Run statistics
    pub summary: RunSummary,
}

impl Reconciliation {
    /// Report rows in code order.
    #[must_use]
    pub fn rows(&self) -> Vec<ReportRow> {
        build_rows(&self.classifier.classify(&self.registry))
    }

    /// Exit code describing the run.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.registry.is_empty() {
            ExitCode::NoCodes
        } else if self.summary.is_partial() {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }
    }
}

/// Drives a run over the configured sources.
pub struct Reconciler {
    config: ReconcileConfig,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Reconciler {
    /// Create a reconciler.
    #[must_use]
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run a full reconciliation with the baseline duplicate rule.
    #[must_use]
    pub fn run(&self) -> Reconciliation {
        let start = Instant::now();
        let mut registry = Registry::new();
        let mut derived = DerivedCodes::default();
        let mut summary = RunSummary::default();

        let baseline_paths = self.baseline_manifests(&mut summary);
        let mut baseline = None;
        for batch in self.read_manifests(&baseline_paths, &mut summary) {
            if baseline.is_none() {
                log::info!("Baseline: {}", batch.label);
                baseline = Some(batch.label.clone());
            }
            registry.observe_batch(&batch);
        }
        if baseline.is_none() {
            log::warn!("No baseline manifest found; no code will be flagged as duplicate");
        }

        let external = self.external_manifests(&baseline_paths, &mut summary);
        for batch in self.read_manifests(&external, &mut summary) {
            registry.observe_batch(&batch);
            derived.add(&batch);
        }

        for root in &self.config.scan_roots {
            if let Some(batch) = self.scan_root(root, &mut summary) {
                registry.observe_batch(&batch);
                derived.add(&batch);
            }
        }

        summary.baseline = baseline.clone();
        let classifier = DuplicateClassifier::with_baseline(baseline);
        finish(registry, classifier, derived.into_manifests(), summary, start)
    }

    /// Compare manifests with each other: a code seen in two or more is a duplicate.
    #[must_use]
    pub fn compare(&self, manifests: &[PathBuf]) -> Reconciliation {
        let start = Instant::now();
        let mut registry = Registry::new();
        let mut summary = RunSummary::default();

        for batch in self.read_manifests(manifests, &mut summary) {
            registry.observe_batch(&batch);
        }

        let classifier = DuplicateClassifier::new(DuplicatePolicy::MultiSource);
        finish(registry, classifier, Vec::new(), summary, start)
    }

    fn baseline_manifests(&self, summary: &mut RunSummary) -> Vec<PathBuf> {
        let Some(ref dir) = self.config.baseline_dir else {
            return Vec::new();
        };
        let marker = self.config.baseline_marker.as_str();
        if marker.is_empty() {
            log::warn!("Baseline marker is empty; skipping baseline discovery");
            return Vec::new();
        }

        match self.list(dir) {
            Ok(files) => files
                .into_iter()
                .filter(|p| {
                    p.file_name()
                        .is_some_and(|n| n.to_string_lossy().contains(marker))
                })
                .collect(),
            Err(e) => {
                summary.record_failure("baseline directory", &e);
                Vec::new()
            }
        }
    }

    fn external_manifests(&self, already_read: &[PathBuf], summary: &mut RunSummary) -> Vec<PathBuf> {
        let Some(ref dir) = self.config.manifest_dir else {
            return Vec::new();
        };
        if !dir.exists() {
            log::info!("Manifest directory {} not found, skipping", dir.display());
            return Vec::new();
        }

        match self.list(dir) {
            Ok(files) => files
                .into_iter()
                .filter(|p| !already_read.contains(p))
                .collect(),
            Err(e) => {
                summary.record_failure("manifest directory", &e);
                Vec::new()
            }
        }
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
        list_manifests(
            dir,
            &self.config.manifest_extensions,
            self.config.exclude_marker.as_deref(),
        )
    }

    /// Read `paths` in order under one manifest progress phase.
    fn read_manifests(&self, paths: &[PathBuf], summary: &mut RunSummary) -> Vec<SourceBatch> {
        if paths.is_empty() {
            return Vec::new();
        }
        self.phase_start(paths.len());
        let mut batches = Vec::with_capacity(paths.len());
        for (idx, path) in paths.iter().enumerate() {
            self.phase_progress(idx + 1, path);
            batches.extend(self.read_manifest(path, summary));
        }
        self.phase_end();
        batches
    }

    fn read_manifest(&self, path: &Path, summary: &mut RunSummary) -> Option<SourceBatch> {
        let reader = ManifestReader::new(path, self.config.manifest.clone());
        match reader.read() {
            Ok(batch) => {
                summary.manifests_read += 1;
                Some(batch)
            }
            Err(e) => {
                summary.record_failure(&format!("manifest {}", path.display()), &e);
                None
            }
        }
    }

    fn scan_root(&self, root: &Path, summary: &mut RunSummary) -> Option<SourceBatch> {
        if !root.exists() {
            log::warn!("Scan root {} does not exist, skipping", root.display());
            return None;
        }

        let mut scanner = FilesystemScanner::new(root, self.config.scan.clone());
        if let Some(ref progress) = self.progress {
            scanner = scanner.with_progress(Arc::clone(progress));
        }

        match scanner.read() {
            Ok(batch) => {
                summary.roots_scanned += 1;
                summary.items_skipped += batch.skipped.len();
                summary
                    .warnings
                    .extend(batch.skipped.iter().map(ToString::to_string));
                Some(batch)
            }
            Err(e) => {
                summary.record_failure(&format!("root {}", root.display()), &e);
                None
            }
        }
    }

    fn phase_start(&self, total: usize) {
        if let Some(ref progress) = self.progress {
            progress.on_phase_start(PHASE_MANIFESTS, total);
        }
    }

    fn phase_progress(&self, current: usize, path: &Path) {
        if let Some(ref progress) = self.progress {
            progress.on_progress(current, &path.to_string_lossy());
        }
    }

    fn phase_end(&self) {
        if let Some(ref progress) = self.progress {
            progress.on_phase_end(PHASE_MANIFESTS);
        }
    }
}

/// Distinct codes per source label, merged across batches.
#[derive(Debug, Default)]
struct DerivedCodes(BTreeMap<SourceLabel, BTreeSet<CanonicalCode>>);

impl DerivedCodes {
    fn add(&mut self, batch: &SourceBatch) {
        let Some(manifest) = batch.derived_manifest() else {
            return;
        };
        self.0.entry(manifest.label).or_default().extend(manifest.codes);
    }

    fn into_manifests(self) -> Vec<DerivedManifest> {
        self.0
            .into_iter()
            .map(|(label, codes)| DerivedManifest {
                label,
                codes: codes.into_iter().collect(),
            })
            .collect()
    }
}

fn finish(
    registry: Registry,
    classifier: DuplicateClassifier,
    derived: Vec<DerivedManifest>,
    mut summary: RunSummary,
    start: Instant,
) -> Reconciliation {
    summary.distinct_codes = registry.len();
    summary.duplicates = registry
        .iter()
        .filter(|entry| classifier.is_duplicate(entry))
        .count();
    summary.total_size = registry.total_size();
    summary.duration = start.elapsed();

    if registry.is_empty() {
        log::warn!("No codes found in any source");
    }

    Reconciliation {
        registry,
        classifier,
        derived,
        summary,
    }
}
