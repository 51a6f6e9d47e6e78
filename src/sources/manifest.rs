//! Manifest reader: extracts codes from a free-text list.
//!
//! A manifest is any text file with codes somewhere in its lines. The bytes
//! are decoded through an [`EncodingChain`] (the first encoding that yields a
//! code wins), then every line is passed through the code normalizer. Codes
//! are collected as a set; manifests never carry sizes.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::decode::{decode_with_fallback, EncodingChain};
use super::{Observation, SourceBatch, SourceError, SourceKind, SourceReader};
use crate::codes::{normalize, normalize_all, CanonicalCode};

/// Options for reading manifests.
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    /// Encodings tried in order.
    pub encodings: EncodingChain,
    /// Take every code on a line instead of only the first.
    pub all_matches_per_line: bool,
}

/// Reads one manifest file.
#[derive(Debug, Clone)]
pub struct ManifestReader {
    path: PathBuf,
    label: String,
    options: ManifestOptions,
}

impl ManifestReader {
    /// Create a reader labelled with the file stem of `path`.
    #[must_use]
    pub fn new(path: &Path, options: ManifestOptions) -> Self {
        Self {
            path: path.to_path_buf(),
            label: manifest_label(path),
            options,
        }
    }

    /// Path of the manifest.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extract the distinct codes of already-decoded text.
    #[must_use]
    pub fn extract(&self, text: &str) -> BTreeSet<CanonicalCode> {
        let mut codes = BTreeSet::new();
        for line in text.lines() {
            if self.options.all_matches_per_line {
                codes.extend(normalize_all(line));
            } else if let Some(code) = normalize(line) {
                codes.insert(code);
            }
        }
        codes
    }
}

impl SourceReader for ManifestReader {
    fn label(&self) -> &str {
        &self.label
    }

    fn read(&self) -> Result<SourceBatch, SourceError> {
        let bytes = fs::read(&self.path).map_err(|e| SourceError::from_io(&self.path, e))?;

        let decoded = decode_with_fallback(&bytes, &self.options.encodings, |text| {
            text.lines().any(|line| normalize(line).is_some())
        });
        if decoded.accepted {
            log::debug!("Decoded {} as {}", self.path.display(), decoded.encoding);
        } else {
            log::debug!(
                "No codes in {} under any configured encoding",
                self.path.display()
            );
        }

        let mut batch = SourceBatch::new(self.label.clone(), SourceKind::Manifest, &self.path);
        batch.observations = self
            .extract(&decoded.text)
            .into_iter()
            .map(Observation::new)
            .collect();

        log::info!(
            "Read manifest {}: {} codes",
            self.path.display(),
            batch.observations.len()
        );
        Ok(batch)
    }
}

/// Label of a manifest: its file name without the extension.
#[must_use]
pub fn manifest_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// List manifest files in `dir`, sorted by file name.
///
/// A file qualifies when its extension is one of `extensions` (compared
/// case-insensitively, without the dot) and its name does not contain
/// `exclude_marker`.
///
/// # Errors
///
/// Returns [`SourceError`] when the directory itself cannot be listed.
/// Unreadable entries are skipped.
pub fn list_manifests(
    dir: &Path,
    extensions: &[String],
    exclude_marker: Option<&str>,
) -> Result<Vec<PathBuf>, SourceError> {
    let entries = fs::read_dir(dir).map_err(|e| SourceError::from_io(dir, e))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        })
        .filter(|path| match (exclude_marker, path.file_name()) {
            (Some(marker), Some(name)) if !marker.is_empty() => {
                !name.to_string_lossy().contains(marker)
            }
            _ => true,
        })
        .collect();

    files.sort();
    Ok(files)
}
