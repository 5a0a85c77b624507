//! File readers for the raw extracts.
//!
//! Two extracts arrive as xlsx workbooks and two as `;`-separated text with
//! comma decimals. Both are read into [`RawTable`]s of plain strings; type
//! coercion happens later in the cleaning pass.

use crate::clean;
use crate::error::{AnalyticsError, Result};
use crate::table::RawTable;
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;

/// Delimiter used by the text extracts and the filtered export.
pub const DELIMITER: u8 = b';';

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AnalyticsError::MissingInput(path.to_path_buf()))
    }
}

fn strip_bom(value: &str) -> &str {
    value.trim_start_matches('\u{feff}')
}

/// Reads a `;`-separated UTF-8 text extract. A UTF-8 BOM on the first
/// header is tolerated; rows may be ragged.
pub fn read_delimited(path: &Path) -> Result<RawTable> {
    require_file(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_path(path)?;

    let name = table_name(path);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| strip_bom(h).to_string())
        .collect();

    let mut table = RawTable::with_headers(name, headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    log::info!(
        "Loaded '{}': {} rows, {} columns",
        table.name,
        table.row_count(),
        table.headers.len()
    );
    Ok(table)
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => clean::format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Reads the first worksheet of an xlsx workbook. The first row is taken as
/// the header row; date cells render as ISO dates.
pub fn read_spreadsheet(path: &Path) -> Result<RawTable> {
    require_file(path)?;

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let name = table_name(path);

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(RawTable::new(name)),
    };

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(render_cell).collect(),
        None => return Ok(RawTable::new(name)),
    };

    let mut table = RawTable::with_headers(name, headers);
    for row in rows {
        table.push_row(row.iter().map(|cell| render_cell(cell)).collect());
    }

    log::info!(
        "Loaded '{}': {} rows, {} columns",
        table.name,
        table.row_count(),
        table.headers.len()
    );
    Ok(table)
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
