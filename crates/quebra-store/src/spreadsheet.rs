//! # Spreadsheet Reader
//!
//! Turns an import source file into a [`RawSheet`] of strings.
//!
//! | Extension                  | Reader                              |
//! |----------------------------|-------------------------------------|
//! | `.xlsx` `.xlsm` `.xls` `.ods` | calamine, first worksheet        |
//! | `.csv` `.txt`              | csv, `,` or `;` separated           |
//!
//! The first row is the header row. Numeric cells are rendered without a
//! trailing `.0` (`90.0 → "90"`), so quantities and codes read the same
//! from every format.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use quebra_core::import::RawSheet;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

const BOM: char = '\u{feff}';

/// Reads the first worksheet of `path`.
pub fn read_sheet(path: &Path) -> StoreResult<RawSheet> {
    if !path.exists() {
        return Err(StoreError::SourceMissing(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let sheet = match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        "csv" | "txt" => read_csv(path)?,
        other => return Err(StoreError::UnsupportedFormat(other.to_string())),
    };

    debug!(
        path = %path.display(),
        columns = sheet.headers.len(),
        rows = sheet.rows.len(),
        "Import source read"
    );
    Ok(sheet)
}

fn read_workbook(path: &Path) -> StoreResult<RawSheet> {
    let mut workbook = open_workbook_auto(path)?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(RawSheet::default());
    };
    let range = range?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();

    Ok(RawSheet {
        headers,
        rows: rows.collect(),
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.trim().to_string(),
        Data::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.as_f64().to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

fn read_csv(path: &Path) -> StoreResult<RawSheet> {
    let unreadable = |reason: String| StoreError::UnreadableSource {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let contents = String::from_utf8(bytes).map_err(|e| {
        unreadable(format!(
            "texto não está em UTF-8 (byte {})",
            e.utf8_error().valid_up_to()
        ))
    })?;
    let contents = contents.trim_start_matches(BOM);

    let header_line = contents.lines().next().unwrap_or_default();
    let delimiter = if header_line.contains(';') && !header_line.contains(',') {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(contents.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| unreadable(e.to_string()))?;
        rows.push(record.iter().map(|s| s.trim().to_string()).collect::<Vec<_>>());
    }

    let mut rows = rows.into_iter();
    let headers = rows.next().unwrap_or_default();
    Ok(RawSheet {
        headers,
        rows: rows.collect(),
    })
}
