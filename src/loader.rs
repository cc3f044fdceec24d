use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::normalize::normalize_rows;
use crate::types::{CellValue, EnrollmentRow, LoadReport, RawTable};
use crate::util::cell_text;

/// Extensions picked up when searching a directory for the latest export.
pub const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

fn is_workbook(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"));
    !is_lock_file && WORKBOOK_EXTENSIONS.iter().any(|ext| has_extension(path, ext))
}

/// Most recently modified workbook directly inside `dir`.
pub fn find_latest_workbook(dir: &Path) -> Result<PathBuf> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_workbook(&path) {
            continue;
        }
        let modified = fs::metadata(&path)?.modified()?;
        if latest.as_ref().map_or(true, |(t, _)| modified > *t) {
            latest = Some((modified, path));
        }
    }
    latest
        .map(|(_, path)| path)
        .ok_or_else(|| ReportError::NoWorkbookFound(dir.to_path_buf()))
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::Date(value.date()),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

/// Split header and data rows; the first row is the header and sits on
/// worksheet row `header_row`.
fn into_table(mut rows: Vec<Vec<CellValue>>, header_row: usize) -> RawTable {
    if rows.is_empty() {
        return RawTable::default();
    }
    let headers = rows
        .remove(0)
        .iter()
        .map(|c| cell_text(c).unwrap_or_default())
        .collect();
    RawTable {
        header_row,
        headers,
        rows,
    }
}

/// Read one worksheet of a workbook, or the whole file for `.csv` input.
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<RawTable> {
    if has_extension(path, "csv") {
        return read_csv(path);
    }
    let mut workbook = open_workbook_auto(path).map_err(|source| ReportError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet_name) {
        return Err(ReportError::SheetNotFound {
            sheet: sheet_name.to_string(),
            path: path.to_path_buf(),
            available,
        });
    }
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|source| ReportError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;
    // The range begins at the first used cell, not at A1.
    let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(into_table(rows, header_row))
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(into_table(rows, 1))
}

/// Read the configured sheet and normalize it.
pub fn load_and_clean(
    path: &Path,
    config: &ReportConfig,
) -> Result<(Vec<EnrollmentRow>, LoadReport)> {
    let table = read_sheet(path, &config.sheet_name)?;
    log::debug!(
        "Read {} data rows with headers {:?}",
        table.rows.len(),
        table.headers
    );
    normalize_rows(&table, &config.columns)
}
