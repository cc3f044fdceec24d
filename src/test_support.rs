use chrono::NaiveDate;

use crate::normalize::normalize_population_type;
use crate::types::EnrollmentRow;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Row with the given population fields; `source_row` is left at 0.
pub fn row(
    client_id: &str,
    population_type: &str,
    population_size: f64,
    total_oe_count: f64,
    confirmed_oe_count: f64,
    start: NaiveDate,
    end: NaiveDate,
) -> EnrollmentRow {
    EnrollmentRow {
        source_row: 0,
        client_id: client_id.to_string(),
        population_type: normalize_population_type(Some(population_type)),
        population_size,
        total_oe_count,
        confirmed_oe_count,
        start_date: start,
        end_date: end,
    }
}

/// Number rows by position, as if they were read in this order.
pub fn numbered(mut rows: Vec<EnrollmentRow>) -> Vec<EnrollmentRow> {
    for (i, r) in rows.iter_mut().enumerate() {
        r.source_row = i + 2;
    }
    rows
}
