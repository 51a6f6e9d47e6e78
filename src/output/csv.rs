//! CSV output formatter for the reconciliation report.
//!
//! Provides the plain tabular artifact (`db.csv`). Every field is quoted and
//! the file starts with a UTF-8 byte-order mark so spreadsheet tools pick
//! the right encoding.
//!
//! # Columns
//!
//! - `code`: Canonical code
//! - `size`: Aggregate size in GiB (2 decimals) or `-`
//! - `source`: Sorted source labels joined with ` | `
//! - `is_dup`: `1` when the code is a duplicate, `0` otherwise
//!
//! # Example
//!
//! ```no_run
//! use codesweep::output::csv::CsvOutput;
//!
//! let output = CsvOutput::new(&[]);
//! output.write_to(std::io::stdout()).unwrap();
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::{ReportError, ReportRow};

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV output formatter.
pub struct CsvOutput<'a> {
    rows: &'a [ReportRow],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(rows: &'a [ReportRow]) -> Self {
        Self { rows }
    }

    /// Write the CSV output, including the byte-order mark, to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if writing or serialization fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        writer.write_all(UTF8_BOM)?;

        let mut csv_writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(writer);

        if self.rows.is_empty() {
            csv_writer.write_record(["code", "size", "source", "is_dup"])?;
        }
        for row in self.rows {
            csv_writer.serialize(row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Write the CSV output to a file, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the file cannot be created or written.
    pub fn write_file(&self, path: &Path) -> Result<(), ReportError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Generate CSV output as a string, without the byte-order mark.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if serialization fails.
    pub fn to_string(&self) -> Result<String, ReportError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        let body = buffer.strip_prefix(UTF8_BOM).unwrap_or(&buffer);
        String::from_utf8(body.to_vec())
            .map_err(|e| ReportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
