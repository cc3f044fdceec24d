//! Scalar aggregates for one week window.

use chrono::{Datelike, NaiveDate};

use crate::config::LivesBasis;
use crate::dedup::dedupe_clients;
use crate::types::EnrollmentRow;

/// Confirmed events count from this day of the week-end's year onward.
pub const CONFIRMED_CUTOFF_MONTH: u32 = 9;
pub const CONFIRMED_CUTOFF_DAY: u32 = 8;

pub fn unique_client_count(rows: &[EnrollmentRow]) -> usize {
    dedupe_clients(rows).len()
}

/// Lives still to be confirmed for a single row, never negative.
pub fn row_lives_active(row: &EnrollmentRow) -> f64 {
    let lives = if row.total_oe_count > 0.0 {
        row.total_oe_count - row.confirmed_oe_count
    } else {
        row.population_size
    };
    lives.max(0.0)
}

/// Sum of [`row_lives_active`] over every row, truncated to an integer.
pub fn lives_active(rows: &[EnrollmentRow]) -> i64 {
    rows.iter().map(row_lives_active).sum::<f64>() as i64
}

pub fn confirmed_cutoff(week_end: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(week_end.year(), CONFIRMED_CUTOFF_MONTH, CONFIRMED_CUTOFF_DAY)
}

/// Confirmed events of rows starting between the September 8 cutoff and
/// `week_end`, inclusive.
pub fn lives_confirmed(rows: &[EnrollmentRow], week_end: NaiveDate) -> i64 {
    let Some(cutoff) = confirmed_cutoff(week_end) else {
        return 0;
    };
    rows.iter()
        .filter(|r| r.starts_within(cutoff, week_end))
        .map(|r| r.confirmed_oe_count)
        .sum::<f64>() as i64
}

/// Rows the lives metrics are computed over for the chosen basis.
pub fn lives_rows(rows: &[EnrollmentRow], basis: LivesBasis) -> Vec<EnrollmentRow> {
    match basis {
        LivesBasis::Rows => rows.to_vec(),
        LivesBasis::Clients => dedupe_clients(rows),
    }
}
