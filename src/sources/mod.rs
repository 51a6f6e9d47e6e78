//! Sources of identifier codes.
//!
//! This module provides functionality for:
//! - Reading text manifests with encoding fallback ([`manifest`])
//! - Walking media folders and matching file names ([`walker`])
//! - Deriving a stable label for a scanned root ([`label`])
//!
//! # Architecture
//!
//! Every source implements [`SourceReader`]. Reading produces a
//! [`SourceBatch`]: the source label plus one [`Observation`] per code
//! occurrence. A batch is pure data; persisting its derived manifest is the
//! job of [`crate::output::manifest`].
//!
//! Failures on individual items (one unreadable file during a walk) are
//! recorded in [`SourceBatch::skipped`] and never abort the read. A failure
//! of the whole source (the manifest cannot be opened, the root is missing)
//! is returned as a [`SourceError`] for the caller to log and skip.
//!
//! # Example
//!
//! ```no_run
//! use codesweep::sources::{ManifestReader, ManifestOptions, SourceReader};
//! use std::path::Path;
//!
//! let reader = ManifestReader::new(Path::new("history.txt"), ManifestOptions::default());
//! let batch = reader.read().unwrap();
//! println!("{}: {} codes", batch.label, batch.distinct_codes().len());
//! ```

pub mod decode;
pub mod label;
pub mod manifest;
pub mod walker;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::codes::CanonicalCode;

pub use decode::{decode_with_fallback, DecodeError, EncodingChain};
pub use label::derive_root_label;
pub use manifest::{ManifestOptions, ManifestReader};
pub use walker::{FilesystemScanner, ScanOptions};

/// Identifier of where a code was observed.
pub type SourceLabel = String;

/// What kind of source produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A text manifest
    Manifest,
    /// A walked directory tree
    Filesystem,
}

/// A single occurrence of a code in a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// The canonical code
    pub code: CanonicalCode,
    /// Bytes attributed to this occurrence (zero for manifests)
    pub size_bytes: u64,
}

impl Observation {
    /// Create an observation with no size attributed.
    #[must_use]
    pub fn new(code: CanonicalCode) -> Self {
        Self {
            code,
            size_bytes: 0,
        }
    }

    /// Create an observation carrying a file size.
    #[must_use]
    pub fn with_size(code: CanonicalCode, size_bytes: u64) -> Self {
        Self { code, size_bytes }
    }
}

/// Everything a single source produced in one read.
#[derive(Debug)]
pub struct SourceBatch {
    /// Label applied to every observation in the batch
    pub label: SourceLabel,
    /// Kind of source
    pub kind: SourceKind,
    /// Manifest file or scanned root
    pub origin: PathBuf,
    /// Code occurrences, in discovery order
    pub observations: Vec<Observation>,
    /// Items skipped because they could not be read
    pub skipped: Vec<SourceError>,
}

impl SourceBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new(label: impl Into<SourceLabel>, kind: SourceKind, origin: &Path) -> Self {
        Self {
            label: label.into(),
            kind,
            origin: origin.to_path_buf(),
            observations: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Distinct codes in the batch, sorted.
    #[must_use]
    pub fn distinct_codes(&self) -> BTreeSet<CanonicalCode> {
        self.observations.iter().map(|o| o.code.clone()).collect()
    }

    /// Sum of all observation sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.observations.iter().map(|o| o.size_bytes).sum()
    }

    /// The per-source code list to persist, or `None` when no code was found.
    #[must_use]
    pub fn derived_manifest(&self) -> Option<DerivedManifest> {
        let codes = self.distinct_codes();
        if codes.is_empty() {
            return None;
        }
        Some(DerivedManifest {
            label: self.label.clone(),
            codes: codes.into_iter().collect(),
        })
    }
}

/// Sorted distinct codes of one source, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedManifest {
    /// Source label; also the output file stem
    pub label: SourceLabel,
    /// Distinct codes in ascending order
    pub codes: Vec<CanonicalCode>,
}

/// Capability shared by every code source.
pub trait SourceReader {
    /// Label the source's observations are recorded under.
    fn label(&self) -> &str;

    /// Read the source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source as a whole cannot be read.
    fn read(&self) -> Result<SourceBatch, SourceError>;
}

/// Errors that can occur while reading a source.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
