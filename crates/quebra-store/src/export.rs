//! # Table Export
//!
//! Serializes a [`Table`] as CSV text or as an XLSX workbook. Both keep the
//! table's column order exactly.

use std::path::Path;

use quebra_core::{Cell, Table};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::persist::write_atomic;

/// Sheet name of exported workbooks.
pub const SHEET_NAME: &str = "Relatorio";

/// Largest quantity an XLSX number cell holds exactly (2^53).
pub const MAX_EXACT_XLSX_INTEGER: u64 = 1 << 53;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(StoreError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn encode(self, table: &Table) -> StoreResult<Vec<u8>> {
        match self {
            ExportFormat::Csv => to_csv(table),
            ExportFormat::Xlsx => to_xlsx(table),
        }
    }
}

/// Writes `table` to `path` in the format its extension names.
pub fn export_to(table: &Table, path: &Path) -> StoreResult<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    write_table(table, path, format)?;
    Ok(format)
}

/// Writes `table` to `path` in `format`, whatever the extension.
pub fn write_table(table: &Table, path: &Path, format: ExportFormat) -> StoreResult<()> {
    write_atomic(path, &format.encode(table)?)?;
    info!(path = %path.display(), ?format, rows = table.len(), "Table exported");
    Ok(())
}

/// CSV bytes: header row then one line per table row.
pub fn to_csv(table: &Table) -> StoreResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Cell::to_string))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Csv(csv::Error::from(e.into_error())))?;

    debug!(rows = table.len(), bytes = bytes.len(), "CSV export built");
    Ok(bytes)
}

/// XLSX bytes: one worksheet, header in bold.
///
/// Numbers are written as numbers and dates as `yyyy-mm-dd` text, so the
/// workbook opens with the same values the CSV shows. Quantities above
/// [`MAX_EXACT_XLSX_INTEGER`] are written as text.
pub fn to_xlsx(table: &Table) -> StoreResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &bold)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            match cell {
                Cell::Empty => {}
                Cell::Integer(value) if *value <= MAX_EXACT_XLSX_INTEGER => {
                    sheet.write_number(excel_row, col, *value as f64)?;
                }
                Cell::Integer(value) => {
                    sheet.write_string(excel_row, col, value.to_string())?;
                }
                Cell::Decimal(value) => match value.to_f64() {
                    Some(number) => {
                        sheet.write_number(excel_row, col, number)?;
                    }
                    None => {
                        sheet.write_string(excel_row, col, value.to_string())?;
                    }
                },
                Cell::Text(_) | Cell::Date(_) => {
                    sheet.write_string(excel_row, col, cell.to_string())?;
                }
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    debug!(rows = table.len(), bytes = bytes.len(), "XLSX export built");
    Ok(bytes)
}
