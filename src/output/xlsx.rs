//! Spreadsheet output for the reconciliation report.
//!
//! Same rows as the CSV, written with `rust_xlsxwriter`: a bold frozen
//! header, numeric size cells (the placeholder stays text), and duplicate
//! rows highlighted in red.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};

use super::{ReportError, ReportRow};

/// Column headers of the spreadsheet.
pub const HEADERS: [&str; 4] = ["Code", "Size (GB)", "Sources", "Duplicate"];

const SHEET_NAME: &str = "Summary";
const DUPLICATE_FILL: u32 = 0xFFC7CE;
const DUPLICATE_FONT: u32 = 0x9C0006;

/// XLSX output formatter.
pub struct XlsxOutput<'a> {
    rows: &'a [ReportRow],
}

impl<'a> XlsxOutput<'a> {
    /// Create a new spreadsheet formatter.
    #[must_use]
    pub fn new(rows: &'a [ReportRow]) -> Self {
        Self { rows }
    }

    fn build(&self) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let plain = Format::new();
        let duplicate = Format::new()
            .set_background_color(Color::RGB(DUPLICATE_FILL))
            .set_font_color(Color::RGB(DUPLICATE_FONT));

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        for (col, title) in (0u16..).zip(HEADERS) {
            worksheet.write_string_with_format(0, col, title, &header)?;
        }
        worksheet.set_freeze_panes(1, 0)?;
        worksheet.set_column_width(0, 16)?;
        worksheet.set_column_width(1, 10)?;
        worksheet.set_column_width(2, 48)?;
        worksheet.set_column_width(3, 10)?;

        for (row_idx, row) in (1u32..).zip(self.rows) {
            let format = if row.is_duplicate() { &duplicate } else { &plain };
            write_row(worksheet, row_idx, row, format)?;
        }

        Ok(workbook)
    }

    /// Write the spreadsheet to `path`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Xlsx` if the workbook cannot be built or saved.
    pub fn write_file(&self, path: &Path) -> Result<(), ReportError> {
        let mut workbook = self.build()?;
        workbook.save(path)?;
        Ok(())
    }

    /// Render the spreadsheet into memory.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Xlsx` if the workbook cannot be built.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReportError> {
        let mut workbook = self.build()?;
        Ok(workbook.save_to_buffer()?)
    }
}

fn write_row(
    worksheet: &mut Worksheet,
    row_idx: u32,
    row: &ReportRow,
    format: &Format,
) -> Result<(), XlsxError> {
    worksheet.write_string_with_format(row_idx, 0, &row.code, format)?;
    match row.size_gib {
        Some(gib) => worksheet.write_number_with_format(row_idx, 1, gib, format)?,
        None => worksheet.write_string_with_format(row_idx, 1, &row.size, format)?,
    };
    worksheet.write_string_with_format(row_idx, 2, &row.source, format)?;
    worksheet.write_number_with_format(row_idx, 3, f64::from(row.is_dup), format)?;
    Ok(())
}
