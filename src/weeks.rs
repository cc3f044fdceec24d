//! Last/this/next week windows.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{ReportError, Result};
use crate::types::{WeekSlot, WeekWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekMode {
    /// The Monday–Sunday week containing `as_of` (today when `None`).
    Auto { as_of: Option<NaiveDate> },
    /// Caller-chosen "this week", expected to run Monday to Sunday.
    Explicit { start: NaiveDate, end: NaiveDate },
}

impl WeekMode {
    /// Both bounds or neither; a lone bound is an error.
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        as_of: Option<NaiveDate>,
    ) -> Result<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Ok(WeekMode::Explicit { start, end }),
            (None, None) => Ok(WeekMode::Auto { as_of }),
            _ => Err(ReportError::IncompleteWeekRange),
        }
    }
}

pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The three reporting windows, in Last, This, Next order.
pub fn week_ranges(mode: WeekMode, today: NaiveDate) -> Result<[WeekWindow; 3]> {
    let (start, end) = match mode {
        WeekMode::Auto { as_of } => {
            let monday = monday_of(as_of.unwrap_or(today));
            (monday, monday + Duration::days(6))
        }
        WeekMode::Explicit { start, end } => {
            if end < start {
                return Err(ReportError::InvalidWeekRange { start, end });
            }
            if start.weekday() != Weekday::Mon || end.weekday() != Weekday::Sun {
                log::warn!(
                    "Week {} to {} does not run Monday to Sunday ({} to {})",
                    start,
                    end,
                    start.weekday(),
                    end.weekday()
                );
            }
            (start, end)
        }
    };

    let week = Duration::days(7);
    Ok([
        WeekWindow {
            slot: WeekSlot::Last,
            start: start - week,
            end: end - week,
        },
        WeekWindow {
            slot: WeekSlot::This,
            start,
            end,
        },
        WeekWindow {
            slot: WeekSlot::Next,
            start: start + week,
            end: end + week,
        },
    ])
}
