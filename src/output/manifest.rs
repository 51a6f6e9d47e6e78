//! Writer for derived per-source code lists.
//!
//! Each [`DerivedManifest`] becomes `<output_dir>/<label>.txt`: one code per
//! line, ascending, UTF-8 with a byte-order mark, lines joined by `\n`
//! without a trailing newline. The files are valid manifests for a later run.

use std::fs;
use std::path::{Path, PathBuf};

use super::csv::UTF8_BOM;
use super::ReportError;
use crate::sources::DerivedManifest;

/// Extension of derived manifest files.
pub const MANIFEST_EXTENSION: &str = "txt";

/// Persists derived manifests into a directory.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    output_dir: PathBuf,
}

impl ManifestWriter {
    /// Create a writer targeting `output_dir`.
    #[must_use]
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Destination path for a label.
    #[must_use]
    pub fn path_for(&self, label: &str) -> PathBuf {
        let file_name: String = label
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                other => other,
            })
            .collect();
        self.output_dir
            .join(format!("{file_name}.{MANIFEST_EXTENSION}"))
    }

    /// Render the file contents.
    #[must_use]
    pub fn render(manifest: &DerivedManifest) -> Vec<u8> {
        let body = manifest
            .codes
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(body.as_bytes());
        bytes
    }

    /// Write one manifest, returning the path written.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if the directory or file cannot be written.
    pub fn write(&self, manifest: &DerivedManifest) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(&manifest.label);
        fs::write(&path, Self::render(manifest))?;
        log::debug!(
            "Wrote {} codes to {}",
            manifest.codes.len(),
            path.display()
        );
        Ok(path)
    }
}
