//! Filesystem scanner: walks a root and extracts codes from media file names.
//!
//! # Overview
//!
//! This module provides the [`FilesystemScanner`] struct, a [`SourceReader`]
//! that walks a directory tree with [`walkdir`], keeps regular files whose
//! extension is a configured media extension, and applies the code
//! normalizer to the file name (never the full path). Every match is
//! recorded with the file's byte size.
//!
//! # Features
//!
//! - Deterministic traversal (entries sorted by file name)
//! - Configurable symlink following
//! - Gitignore-style ignore patterns via the `ignore` crate (configured patterns only)
//! - Symlinked files are counted even when links are not followed
//! - Hidden file filtering
//! - Per-item failure tolerance: walk errors are recorded, stat failures count as zero bytes
//!
//! # Example
//!
//! ```no_run
//! use codesweep::sources::{FilesystemScanner, ScanOptions, SourceReader};
//! use std::path::Path;
//!
//! let scanner = FilesystemScanner::new(Path::new("/mnt/media"), ScanOptions::default());
//! let batch = scanner.read().unwrap();
//! for obs in &batch.observations {
//!     println!("{} ({} bytes)", obs.code, obs.size_bytes);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::label::derive_root_label;
use super::{Observation, SourceBatch, SourceError, SourceKind, SourceReader};
use crate::codes::normalize;
use crate::progress::{ProgressCallback, PHASE_WALKING};

/// Media container extensions recognized when nothing is configured.
pub const DEFAULT_MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "wmv", "iso", "mov", "flv", "vob", "rmvb", "ts", "m2ts",
];

/// Options for walking a root.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Lowercase extensions without the leading dot.
    pub media_extensions: Vec<String>,

    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style), relative to the root.
    /// A `.gitignore` inside the root is not consulted.
    pub ignore_patterns: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            media_extensions: DEFAULT_MEDIA_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
        }
    }
}

impl ScanOptions {
    /// Replace the media extensions, normalizing case and leading dots.
    #[must_use]
    pub fn with_media_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.media_extensions = normalize_extensions(extensions);
        self
    }

    /// Whether `path` carries one of the media extensions.
    #[must_use]
    pub fn is_media_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .is_some_and(|ext| self.media_extensions.iter().any(|m| *m == ext))
    }
}

/// Lowercase extensions and strip leading dots.
#[must_use]
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Directory walker producing code observations for one root.
pub struct FilesystemScanner {
    /// Root path to walk
    root: PathBuf,
    /// Label applied to every code found under the root
    label: String,
    /// Walk options
    options: ScanOptions,
    /// Optional progress callback
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FilesystemScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemScanner")
            .field("root", &self.root)
            .field("label", &self.label)
            .field("options", &self.options)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl FilesystemScanner {
    /// Create a scanner for `root`, labelled with [`derive_root_label`].
    #[must_use]
    pub fn new(root: &Path, options: ScanOptions) -> Self {
        Self {
            root: root.to_path_buf(),
            label: derive_root_label(root),
            options,
            progress: None,
        }
    }

    /// Override the derived label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Root being scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Matcher for the configured ignore patterns, `None` when there are none.
    fn build_ignore(&self) -> Option<Gitignore> {
        if self.options.ignore_patterns.is_empty() {
            return None;
        }
        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.options.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Whether the walk should descend into / yield this entry.
    fn keep_entry(&self, entry: &DirEntry, gitignore: Option<&Gitignore>) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        if self.options.skip_hidden && is_hidden(entry) {
            log::trace!("Skipping hidden: {}", entry.path().display());
            return false;
        }
        if let Some(gi) = gitignore {
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let normalized = relative.to_string_lossy().replace('\\', "/");
            if gi.matched(normalized, entry.file_type().is_dir()).is_ignore() {
                log::trace!("Ignoring: {}", entry.path().display());
                return false;
            }
        }
        true
    }

    fn check_root(&self) -> Result<(), SourceError> {
        let metadata = std::fs::metadata(&self.root)
            .map_err(|e| SourceError::from_io(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(SourceError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    fn report_start(&self) {
        if let Some(ref progress) = self.progress {
            progress.on_phase_start(PHASE_WALKING, 0);
            progress.on_message(&self.label);
        }
    }

    fn report_file(&self, count: usize, path: &Path) {
        if let Some(ref progress) = self.progress {
            progress.on_progress(count, &path.to_string_lossy());
        }
    }

    fn report_end(&self) {
        if let Some(ref progress) = self.progress {
            progress.on_phase_end(PHASE_WALKING);
        }
    }
}

impl SourceReader for FilesystemScanner {
    fn label(&self) -> &str {
        &self.label
    }

    fn read(&self) -> Result<SourceBatch, SourceError> {
        self.check_root()?;

        let gitignore = self.build_ignore();
        let mut batch = SourceBatch::new(self.label.clone(), SourceKind::Filesystem, &self.root);
        let mut seen_files = 0usize;

        self.report_start();
        log::debug!("Walking {} as '{}'", self.root.display(), self.label);

        let walker = WalkDir::new(&self.root)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.keep_entry(entry, gitignore.as_ref()));

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    batch.skipped.push(SourceError::from_io(&path, source));
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_dir() || !self.options.is_media_file(path) {
                continue;
            }
            if !entry.file_type().is_file() && !is_link_to_file(&entry) {
                continue;
            }

            seen_files += 1;
            self.report_file(seen_files, path);

            let file_name = entry.file_name().to_string_lossy();
            let Some(code) = normalize(&file_name) else {
                log::trace!("No code in file name: {}", path.display());
                continue;
            };

            // Resolve links so a symlinked file reports its target's size.
            let size = match std::fs::metadata(path) {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    log::debug!("Size lookup failed for {}, counting 0: {}", path.display(), e);
                    0
                }
            };

            batch.observations.push(Observation::with_size(code, size));
        }

        self.report_end();
        log::info!(
            "Scanned {}: {} media files, {} codes",
            self.root.display(),
            seen_files,
            batch.distinct_codes().len()
        );

        Ok(batch)
    }
}

fn is_link_to_file(entry: &DirEntry) -> bool {
    entry.path_is_symlink() && std::fs::metadata(entry.path()).is_ok_and(|m| m.is_file())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
