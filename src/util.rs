// Utility helpers for parsing cells and formatting counts.
//
// This module centralizes the "dirty" spreadsheet handling (stray text in
// number columns, dates stored as text or serials, placeholder strings) so
// the rest of the code can assume clean, typed values.
use chrono::{Duration, NaiveDate};
use num_format::{Locale, ToFormattedString};

use crate::types::CellValue;

/// Placeholder the export writes into date columns that were never filled in.
pub const NO_DATE_SENTINEL: &str = "No date configured";

// Two-digit years are tried first: `%Y` would happily read "25" as year 25.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%y", "%m/%d/%Y"];

/// Resolve the first value produced by `get` across candidates, in order.
///
/// Later candidates are only consulted when every earlier one yields `None`,
/// which makes this a per-row coalesce over fallback columns.
pub fn first_present<C, T, F>(candidates: &[C], get: F) -> Option<T>
where
    F: FnMut(&C) -> Option<T>,
{
    candidates.iter().find_map(get)
}

/// Trimmed text content of a cell, or `None` for blanks and the no-date
/// placeholder.
pub fn cell_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case(NO_DATE_SENTINEL) {
                None
            } else {
                Some(s.to_string())
            }
        }
        // Numeric ids come back from Excel as floats.
        CellValue::Number(f) => {
            if f.fract() == 0.0 {
                Some((*f as i64).to_string())
            } else {
                Some(f.to_string())
            }
        }
        CellValue::Bool(b) => Some(b.to_string()),
        CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
    }
}

pub fn cell_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(f) if f.is_finite() => Some(*f),
        CellValue::Text(s) => parse_f64_safe(Some(s)),
        _ => None,
    }
}

pub fn cell_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(f) => excel_serial_to_date(*f),
        CellValue::Text(s) => parse_date_safe(Some(s)),
        _ => None,
    }
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lenient count parse: missing, unparseable or negative values become 0.
pub fn count_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| *v >= 0.0).unwrap_or(0.0)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case(NO_DATE_SENTINEL) {
        return None;
    }
    // Any time of day follows the date after a space or `T` and is ignored.
    let date_part = s.split(|c: char| c == ' ' || c == 'T').next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Convert an Excel 1900-system serial day number to a date, dropping any
/// time-of-day fraction.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.trunc() as i64)?)
}

/// `"part time"` -> `"Part Time"`; runs of whitespace collapse to one space.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

/// Reference-taking variant of [`format_int`] for table cell rendering.
pub fn format_count<T>(n: &T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_numbers_leniently() {
        assert_eq!(parse_f64_safe(Some(" 1,250 ")), Some(1250.0));
        assert_eq!(parse_f64_safe(Some("12.5")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn count_or_zero_rejects_negatives() {
        assert_eq!(count_or_zero(Some(3.0)), 3.0);
        assert_eq!(count_or_zero(Some(-2.0)), 0.0);
        assert_eq!(count_or_zero(None), 0.0);
    }

    #[test]
    fn parses_common_date_layouts() {
        assert_eq!(parse_date_safe(Some("2025-10-27")), Some(d(2025, 10, 27)));
        assert_eq!(parse_date_safe(Some("10/27/2025")), Some(d(2025, 10, 27)));
        assert_eq!(parse_date_safe(Some("10/27/25")), Some(d(2025, 10, 27)));
        assert_eq!(
            parse_date_safe(Some("2025-10-27 13:45:00")),
            Some(d(2025, 10, 27))
        );
        assert_eq!(parse_date_safe(Some("No date configured")), None);
        assert_eq!(parse_date_safe(Some("soon")), None);
    }

    #[test]
    fn ignores_time_of_day_after_any_date_layout() {
        for text in [
            "2025-10-27T00:00:00",
            "2025-10-27T00:00:00.000",
            "2025-10-27 00:00:00.000",
            "2025-10-27T00:00:00Z",
            "2025-10-27T08:30:00+02:00",
            "2025/10/27 13:45",
            "10/27/2025 1:05 PM",
            "10/27/25 13:05:59",
        ] {
            assert_eq!(parse_date_safe(Some(text)), Some(d(2025, 10, 27)), "{text}");
        }
        assert_eq!(parse_date_safe(Some("Tomorrow")), None);
    }

    #[test]
    fn converts_excel_serials() {
        assert_eq!(excel_serial_to_date(45658.0), Some(d(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(45957.75), Some(d(2025, 10, 27)));
        assert_eq!(excel_serial_to_date(0.0), None);
    }

    #[test]
    fn cell_text_drops_blanks_and_sentinel() {
        assert_eq!(cell_text(&CellValue::Text("  C1 ".into())), Some("C1".into()));
        assert_eq!(cell_text(&CellValue::Text("   ".into())), None);
        assert_eq!(cell_text(&CellValue::Text("no date configured".into())), None);
        assert_eq!(cell_text(&CellValue::Number(1042.0)), Some("1042".into()));
        assert_eq!(cell_text(&CellValue::Empty), None);
    }

    #[test]
    fn first_present_takes_earliest_hit() {
        let columns = [None, Some(2), Some(3)];
        assert_eq!(first_present(&columns, |c| *c), Some(2));
        let empty: [Option<i32>; 2] = [None, None];
        assert_eq!(first_present(&empty, |c| *c), None);
    }

    #[test]
    fn title_cases_free_text() {
        assert_eq!(title_case("part  TIME"), "Part Time");
        assert_eq!(title_case("dependent"), "Dependent");
    }

    #[test]
    fn formats_counts_with_separators() {
        assert_eq!(format_int(9855), "9,855");
        assert_eq!(format_count(&1_234_567i64), "1,234,567");
    }
}
