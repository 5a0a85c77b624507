//! Type coercion and cleaning of raw tables.
//!
//! The pass rewrites cells in place, driven by the fixed column lists in
//! [`crate::schema`]. A malformed value never fails the pipeline: dates
//! degrade to empty (null), numbers to `0`. The pass is idempotent, so
//! running it over an already-cleaned table changes nothing.

use crate::schema::{CATEGORICAL_COLUMNS, DATE_COLUMNS, NUMERIC_COLUMNS};
use crate::table::RawTable;
use chrono::{NaiveDate, NaiveDateTime};

/// Canonical cell rendering of a date.
const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parses a raw date cell, accepting the formats seen across the extracts.
/// Returns `None` for anything unparseable.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// Normalizes a categorical cell: empty becomes `N/A`, everything else is
/// trimmed and uppercased.
pub fn normalize_category(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value.to_uppercase()
    }
}

/// Parses a numeric cell. Comma-decimal input (`1.234,56`) and dot-decimal
/// input (`1234.56`) are both accepted; dots are treated as thousands
/// separators only when a comma decimal is present.
pub fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let normalized = if value.contains(',') {
        value.replace('.', "").replace(',', ".")
    } else {
        value.to_string()
    };
    normalized.replace(' ', "").parse::<f64>().ok()
}

/// Canonical cell rendering of a number. Integral values drop the fraction
/// so re-parsing and re-rendering is stable.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn rewrite_column(table: &mut RawTable, column: &str, rewrite: impl Fn(&str) -> String) {
    if let Some(idx) = table.column_index(column) {
        for row in &mut table.rows {
            if row.len() <= idx {
                row.resize(idx + 1, String::new());
            }
            row[idx] = rewrite(&row[idx]);
        }
    }
}

/// Applies the full cleaning pass to a table in place. Each rule only fires
/// for columns the table actually has.
pub fn clean_table(table: &mut RawTable) {
    for column in DATE_COLUMNS {
        rewrite_column(table, column, |cell| {
            parse_date(cell)
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        });
    }

    for column in CATEGORICAL_COLUMNS {
        rewrite_column(table, column, normalize_category);
    }

    for column in NUMERIC_COLUMNS {
        rewrite_column(table, column, |cell| {
            format_number(parse_number(cell).unwrap_or(0.0))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{COL_DT_REFE, COL_MOMENTO};

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15"), Some(expected));
        assert_eq!(parse_date("15/03/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-15 10:30:00"), Some(expected));
        assert_eq!(parse_date("  2024-03-15  "), Some(expected));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("  comércio "), "COMÉRCIO");
        assert_eq!(normalize_category(""), "N/A");
        assert_eq!(normalize_category("   "), "N/A");
        assert_eq!(normalize_category("declínio"), "DECLÍNIO");
    }

    #[test]
    fn test_parse_number_decimal_conventions() {
        assert_eq!(parse_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_number("10,5"), Some(10.5));
        assert_eq!(parse_number("1234.56"), Some(1234.56));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }

    fn dirty_table() -> RawTable {
        let mut t = RawTable::with_headers(
            "main",
            vec![
                COL_DT_REFE.to_string(),
                COL_MOMENTO.to_string(),
                "total_recebido".to_string(),
            ],
        );
        t.push_row(vec![
            "15/03/2024".to_string(),
            " início ".to_string(),
            "1.234,56".to_string(),
        ]);
        t.push_row(vec!["garbage".to_string(), String::new(), "xx".to_string()]);
        t
    }

    #[test]
    fn test_clean_table_coercions() {
        let mut t = dirty_table();
        clean_table(&mut t);
        assert_eq!(t.rows[0], vec!["2024-03-15", "INÍCIO", "1234.56"]);
        assert_eq!(t.rows[1], vec!["", "N/A", "0"]);
    }

    #[test]
    fn test_clean_table_is_idempotent() {
        let mut once = dirty_table();
        clean_table(&mut once);
        let mut twice = once.clone();
        clean_table(&mut twice);
        assert_eq!(once.rows, twice.rows);
        assert_eq!(once.headers, twice.headers);
    }

    #[test]
    fn test_clean_table_skips_absent_columns() {
        let mut t = RawTable::with_headers("other", vec!["livre".to_string()]);
        t.push_row(vec!["  untouched  ".to_string()]);
        clean_table(&mut t);
        assert_eq!(t.rows[0][0], "  untouched  ");
    }
}
