//! Week-window selection over normalized rows.
//!
//! Each filter returns a new collection and keeps the relative order of the
//! input rows.

use chrono::NaiveDate;

use crate::types::{EnrollmentRow, WeekWindow};

impl EnrollmentRow {
    pub fn starts_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date >= start && self.start_date <= end
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    pub fn ended_before(&self, date: NaiveDate) -> bool {
        self.end_date < date
    }
}

/// Rows whose window starts inside `window`.
pub fn going_live(rows: &[EnrollmentRow], window: &WeekWindow) -> Vec<EnrollmentRow> {
    rows.iter()
        .filter(|r| r.starts_within(window.start, window.end))
        .cloned()
        .collect()
}

/// Rows whose window overlaps `window` at all.
pub fn active(rows: &[EnrollmentRow], window: &WeekWindow) -> Vec<EnrollmentRow> {
    rows.iter()
        .filter(|r| r.overlaps(window.start, window.end))
        .cloned()
        .collect()
}

/// Rows whose window closed before `window` began.
pub fn completed(rows: &[EnrollmentRow], window: &WeekWindow) -> Vec<EnrollmentRow> {
    rows.iter()
        .filter(|r| r.ended_before(window.start))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{d, row};
    use crate::types::WeekSlot;

    fn week() -> WeekWindow {
        WeekWindow {
            slot: WeekSlot::This,
            start: d(2025, 10, 27),
            end: d(2025, 11, 2),
        }
    }

    #[test]
    fn active_includes_window_touching_last_day() {
        let rows = vec![
            row("C1", "Active", 1.0, 0.0, 0.0, d(2025, 11, 2), d(2025, 11, 2)),
            row("C2", "Active", 1.0, 0.0, 0.0, d(2025, 10, 1), d(2025, 10, 26)),
            row("C3", "Active", 1.0, 0.0, 0.0, d(2025, 9, 1), d(2025, 12, 31)),
        ];
        let ids: Vec<_> = active(&rows, &week()).into_iter().map(|r| r.client_id).collect();
        assert_eq!(ids, vec!["C1", "C3"]);
    }

    #[test]
    fn going_live_uses_start_date_only() {
        let rows = vec![
            row("C1", "Active", 1.0, 0.0, 0.0, d(2025, 10, 27), d(2026, 1, 1)),
            row("C2", "Active", 1.0, 0.0, 0.0, d(2025, 10, 26), d(2025, 10, 30)),
            row("C3", "Active", 1.0, 0.0, 0.0, d(2025, 11, 2), d(2025, 11, 9)),
        ];
        let ids: Vec<_> = going_live(&rows, &week()).into_iter().map(|r| r.client_id).collect();
        assert_eq!(ids, vec!["C1", "C3"]);
    }

    #[test]
    fn completed_requires_end_before_week_start() {
        let rows = vec![
            row("C1", "Active", 1.0, 0.0, 0.0, d(2025, 10, 1), d(2025, 10, 26)),
            row("C2", "Active", 1.0, 0.0, 0.0, d(2025, 10, 1), d(2025, 10, 27)),
        ];
        let ids: Vec<_> = completed(&rows, &week()).into_iter().map(|r| r.client_id).collect();
        assert_eq!(ids, vec!["C1"]);
    }

    #[test]
    fn filters_preserve_input_order() {
        let rows = vec![
            row("Z", "Active", 1.0, 0.0, 0.0, d(2025, 10, 28), d(2025, 10, 30)),
            row("A", "Active", 1.0, 0.0, 0.0, d(2025, 10, 27), d(2025, 10, 29)),
        ];
        let ids: Vec<_> = active(&rows, &week()).into_iter().map(|r| r.client_id).collect();
        assert_eq!(ids, vec!["Z", "A"]);
    }
}
