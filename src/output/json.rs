//! JSON output formatter for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "codes": [
//!     {
//!       "code": "ABC-001",
//!       "size_bytes": 1610612736,
//!       "size_gib": 1.5,
//!       "sources": ["E_Media", "history"],
//!       "duplicate": true
//!     }
//!   ],
//!   "summary": {
//!     "policy": { "policy": "baseline", "baseline": "history" },
//!     "manifests_read": 3,
//!     "roots_scanned": 1,
//!     "sources_failed": 0,
//!     "items_skipped": 0,
//!     "distinct_codes": 1,
//!     "duplicates": 1,
//!     "total_size": 1610612736,
//!     "duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "CS000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::{rounded_gib, ReportError};
use crate::error::ExitCode;
use crate::reconcile::Reconciliation;
use crate::registry::{ClassifiedEntry, DuplicatePolicy};

/// A single code in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonCode {
    /// Canonical code
    pub code: String,
    /// Aggregate size in bytes
    pub size_bytes: u64,
    /// Rounded GiB, absent when it rounds to zero
    pub size_gib: Option<f64>,
    /// Sorted source labels
    pub sources: Vec<String>,
    /// Duplicate flag
    pub duplicate: bool,
}

impl JsonCode {
    /// Create a JSON code entry from a classified registry entry.
    #[must_use]
    pub fn from_classified(classified: &ClassifiedEntry<'_>) -> Self {
        let entry = classified.entry;
        Self {
            code: entry.code().to_string(),
            size_bytes: entry.aggregate_size_bytes(),
            size_gib: rounded_gib(entry.aggregate_size_bytes()),
            sources: entry.labels().iter().cloned().collect(),
            duplicate: classified.duplicate,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Duplicate rule applied
    pub policy: DuplicatePolicy,
    /// Manifests read successfully
    pub manifests_read: usize,
    /// Roots walked successfully
    pub roots_scanned: usize,
    /// Sources that could not be read
    pub sources_failed: usize,
    /// Items skipped inside sources
    pub items_skipped: usize,
    /// Distinct codes
    pub distinct_codes: usize,
    /// Codes flagged as duplicates
    pub duplicates: usize,
    /// Sum of aggregate sizes in bytes
    pub total_size: u64,
    /// Duration of the run in milliseconds
    pub duration_ms: u64,
    /// What was skipped and why
    pub warnings: Vec<String>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "CS000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Every code, sorted
    pub codes: Vec<JsonCode>,
    /// Run statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create the JSON document for a finished run.
    #[must_use]
    pub fn new(result: &Reconciliation) -> Self {
        let exit_code: ExitCode = result.exit_code();
        let summary = &result.summary;
        Self {
            codes: result
                .classifier
                .classify(&result.registry)
                .iter()
                .map(JsonCode::from_classified)
                .collect(),
            summary: JsonSummary {
                policy: result.classifier.policy().clone(),
                manifests_read: summary.manifests_read,
                roots_scanned: summary.roots_scanned,
                sources_failed: summary.sources_failed,
                items_skipped: summary.items_skipped,
                distinct_codes: summary.distinct_codes,
                duplicates: summary.duplicates,
                total_size: summary.total_size,
                duration_ms: u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX),
                warnings: summary.warnings.clone(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code().to_string(),
            },
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Json` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{ReconcileConfig, Reconciler};
    use std::fs;
    use tempfile::TempDir;

    fn compared() -> Reconciliation {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "ABC-001\nXYZ-002\n").unwrap();
        fs::write(&b, "ABC-001\n").unwrap();
        Reconciler::new(ReconcileConfig::default()).compare(&[a, b])
    }

    #[test]
    fn test_json_output_structure() {
        let output = JsonOutput::new(&compared());
        let value: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(value["codes"].as_array().unwrap().len(), 2);
        assert_eq!(value["codes"][0]["code"], "ABC-001");
        assert_eq!(value["codes"][0]["duplicate"], true);
        assert_eq!(value["codes"][0]["sources"][1], "b");
        assert!(value["codes"][0]["size_gib"].is_null());
        assert_eq!(value["summary"]["policy"]["policy"], "multi_source");
        assert_eq!(value["summary"]["duplicates"], 1);
        assert_eq!(value["summary"]["exit_code_name"], "CS000");
    }

    #[test]
    fn test_json_write_to_ends_with_newline() {
        let output = JsonOutput::new(&compared());
        let mut buffer = Vec::new();
        output.write_to(&mut buffer).unwrap();
        assert!(buffer.ends_with(b"}\n"));
    }
}
