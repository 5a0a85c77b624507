//! Daily calendar spine derived from the observed reference-date range.
//!
//! The calendar is stateless: it is rebuilt from scratch from whatever dates
//! the loaded tables carry, and exists only to enumerate selectable month
//! buckets (including months with no activity). It is never joined back
//! into company or transaction records.

use crate::error::{AnalyticsError, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Portuguese month names, indexed by month number − 1.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// One day of the calendar spine. All fields are pure functions of `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub data: NaiveDate,
    pub ano: i32,
    pub mes_num: u32,
    pub mes: String,
    pub mes_ano: String,
    pub dia: u32,
}

impl CalendarEntry {
    fn from_date(data: NaiveDate) -> Self {
        Self {
            data,
            ano: data.year(),
            mes_num: data.month(),
            mes: MONTH_NAMES[data.month0() as usize].to_string(),
            mes_ano: month_key(data),
            dia: data.day(),
        }
    }
}

/// `MM/YYYY` bucket key. Any date within the same calendar month produces
/// the same key.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:02}/{}", date.month(), date.year())
}

/// Parses a `MM/YYYY` key back to the first day of its month.
pub fn parse_month_key(key: &str) -> Option<NaiveDate> {
    let (month, year) = key.trim().split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Calendar ordering of month keys: `12/2023` before `01/2024`, never
/// lexicographic. Unparseable keys sort last.
pub fn compare_month_keys(a: &str, b: &str) -> Ordering {
    match (parse_month_key(a), parse_month_key(b)) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sorts month keys chronologically in place.
pub fn sort_month_keys(keys: &mut [String]) {
    keys.sort_by(|a, b| compare_month_keys(a, b));
}

/// Builds the dense daily calendar for the inclusive range spanned by the
/// given dates. Fails when no dates exist at all, since every time filter
/// depends on the spine.
pub fn build_calendar<I>(dates: I) -> Result<Vec<CalendarEntry>>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut min_date: Option<NaiveDate> = None;
    let mut max_date: Option<NaiveDate> = None;
    for date in dates {
        min_date = Some(min_date.map_or(date, |d| d.min(date)));
        max_date = Some(max_date.map_or(date, |d| d.max(date)));
    }

    let (start, end) = match (min_date, max_date) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(AnalyticsError::NoReferenceDates),
    };

    log::debug!("Calendar span: {} to {}", start, end);

    let mut entries = Vec::new();
    let mut current = start;
    while current <= end {
        entries.push(CalendarEntry::from_date(current));
        current = match current.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(entries)
}

/// Distinct `MM/YYYY` keys of the calendar in chronological order, the
/// option list for the month filter.
pub fn month_options(calendar: &[CalendarEntry]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for entry in calendar {
        if keys.last().map(String::as_str) != Some(entry.mes_ano.as_str()) {
            keys.push(entry.mes_ano.clone());
        }
    }
    keys
}
