//! Report rendering for a classified registry.
//!
//! This module turns classified registry entries into [`ReportRow`]s and
//! persists them:
//! - CSV (`db.csv`) for the web page and version control ([`csv`])
//! - XLSX spreadsheet with duplicate highlighting ([`xlsx`])
//! - JSON on stdout for scripting ([`json`])
//! - One sorted code list per source ([`manifest`])
//!
//! # Values
//!
//! - Rows are sorted by code ascending.
//! - Size is the aggregate in GiB (1024³ bytes) rounded to 2 decimals; a
//!   size that rounds to zero renders as [`SIZE_PLACEHOLDER`].
//! - Labels are sorted and joined with [`LABEL_SEPARATOR`].
//! - The duplicate flag is `1` or `0`.
//!
//! # Example
//!
//! ```
//! use codesweep::codes::normalize;
//! use codesweep::output::build_rows;
//! use codesweep::registry::{DuplicateClassifier, Registry};
//!
//! let mut registry = Registry::new();
//! registry.observe(normalize("abc-001").unwrap(), "history", 0);
//! registry.observe(normalize("abc-001").unwrap(), "E_Media", 1_610_612_736);
//!
//! let classifier = DuplicateClassifier::with_baseline(Some("history".into()));
//! let rows = build_rows(&classifier.classify(&registry));
//! assert_eq!(rows[0].size, "1.5");
//! assert_eq!(rows[0].source, "E_Media | history");
//! assert_eq!(rows[0].is_dup, 1);
//! ```

pub mod csv;
pub mod json;
pub mod manifest;
pub mod xlsx;

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::registry::ClassifiedEntry;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::manifest::ManifestWriter;
pub use self::xlsx::XlsxOutput;

/// Rendered size when the aggregate rounds to zero GiB.
pub const SIZE_PLACEHOLDER: &str = "-";

/// Separator between labels in the source column.
pub const LABEL_SEPARATOR: &str = " | ";

const BYTES_PER_GIB: f64 = 1_073_741_824.0;

/// Errors that can occur while writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Error from the spreadsheet writer.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One report line, shared by every tabular format.
///
/// Field names are the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Canonical code
    pub code: String,
    /// GiB rounded to 2 decimals, or the placeholder
    pub size: String,
    /// Sorted labels joined with the separator
    pub source: String,
    /// 1 when the code is a duplicate
    pub is_dup: u8,
    /// Rounded GiB as a number, `None` when it renders as the placeholder
    #[serde(skip)]
    pub size_gib: Option<f64>,
}

impl ReportRow {
    /// Build the row for a classified entry.
    #[must_use]
    pub fn from_classified(classified: &ClassifiedEntry<'_>) -> Self {
        let entry = classified.entry;
        let size_gib = rounded_gib(entry.aggregate_size_bytes());
        Self {
            code: entry.code().to_string(),
            size: size_gib.map_or_else(|| SIZE_PLACEHOLDER.to_string(), format_gib),
            source: entry
                .labels()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(LABEL_SEPARATOR),
            is_dup: u8::from(classified.duplicate),
            size_gib,
        }
    }

    /// Whether the row is flagged as a duplicate.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.is_dup == 1
    }
}

/// Build report rows, sorted by code.
#[must_use]
pub fn build_rows(classified: &[ClassifiedEntry<'_>]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = classified.iter().map(ReportRow::from_classified).collect();
    rows.sort_by(|a, b| a.code.cmp(&b.code));
    rows
}

/// Aggregate bytes as GiB rounded to 2 decimals; `None` when that is zero.
#[must_use]
pub fn rounded_gib(bytes: u64) -> Option<f64> {
    let rounded = (bytes as f64 / BYTES_PER_GIB * 100.0).round() / 100.0;
    (rounded > 0.0).then_some(rounded)
}

/// Render a rounded GiB value with at most 2 decimals and at least one.
///
/// `1.5` renders as `"1.5"`, `2.0` as `"2.0"`, `0.25` as `"0.25"`.
#[must_use]
pub fn format_gib(gib: f64) -> String {
    let fixed = format!("{gib:.2}");
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

/// Render an aggregate size for display.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    rounded_gib(bytes).map_or_else(|| SIZE_PLACEHOLDER.to_string(), format_gib)
}
