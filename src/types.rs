use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use tabled::Tabled;

use crate::util::format_count;

/// A single worksheet cell, independent of the library that read it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

/// Header row plus data rows of one worksheet, as read from disk.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// 1-based worksheet row holding the headers; data follows directly below.
    pub header_row: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Default for RawTable {
    fn default() -> Self {
        RawTable {
            header_row: 1,
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl RawTable {
    /// Worksheet row number of data row `idx`.
    pub fn source_row(&self, idx: usize) -> usize {
        self.header_row + 1 + idx
    }

    /// Indices of the headers matching `candidates`, in candidate order.
    ///
    /// Headers are compared trimmed and case-insensitively; candidates with no
    /// matching header are skipped.
    pub fn candidate_columns(&self, candidates: &[String]) -> Vec<usize> {
        candidates
            .iter()
            .filter_map(|name| {
                let name = name.trim();
                self.headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(name))
            })
            .collect()
    }

    pub fn is_blank_row(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |r| r.iter().all(|c| matches!(c, CellValue::Empty)))
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PopulationType {
    Active,
    Cobra,
    Retiree,
    /// Free-text type that did not match a known category, title-cased.
    Other(String),
}

impl PopulationType {
    /// Dedup priority: Active, then COBRA, then Retiree, then everything else.
    pub fn priority_rank(&self) -> u8 {
        match self {
            PopulationType::Active => 0,
            PopulationType::Cobra => 1,
            PopulationType::Retiree => 2,
            PopulationType::Other(_) => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PopulationType::Active => "Active",
            PopulationType::Cobra => "COBRA",
            PopulationType::Retiree => "Retiree",
            PopulationType::Other(s) => s,
        }
    }
}

impl fmt::Display for PopulationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PopulationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One normalized enrollment record. `start_date <= end_date` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRow {
    /// 1-based worksheet row (the header is row 1).
    pub source_row: usize,
    pub client_id: String,
    pub population_type: PopulationType,
    pub population_size: f64,
    pub total_oe_count: f64,
    pub confirmed_oe_count: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub retained_rows: usize,
    pub missing_client_id: usize,
    pub missing_dates: usize,
    pub inverted_windows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeekSlot {
    #[serde(rename = "Last Week")]
    Last,
    #[serde(rename = "This Week")]
    This,
    #[serde(rename = "Next Week")]
    Next,
}

impl WeekSlot {
    pub fn name(self) -> &'static str {
        match self {
            WeekSlot::Last => "Last Week",
            WeekSlot::This => "This Week",
            WeekSlot::Next => "Next Week",
        }
    }
}

/// Inclusive reporting window, normally Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub slot: WeekSlot,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// `MM/DD - MM/DD`
    pub fn range_label(&self) -> String {
        format!("{} - {}", self.start.format("%m/%d"), self.end.format("%m/%d"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct SummaryRow {
    #[serde(rename = "Week")]
    #[tabled(rename = "Week")]
    pub week: String,
    #[serde(rename = "Clients Going Live")]
    #[tabled(rename = "Clients Going Live", display_with = "format_count")]
    pub clients_going_live: usize,
    #[serde(rename = "Clients Active")]
    #[tabled(rename = "Clients Active", display_with = "format_count")]
    pub clients_active: usize,
    #[serde(rename = "Clients Completed")]
    #[tabled(rename = "Clients Completed", display_with = "format_count")]
    pub clients_completed: usize,
    #[serde(rename = "Lives Active (Not Confirmed)")]
    #[tabled(rename = "Lives Active (Not Confirmed)", display_with = "format_count")]
    pub lives_active: i64,
    #[serde(rename = "Lives Confirmed & Complete")]
    #[tabled(rename = "Lives Confirmed & Complete", display_with = "format_count")]
    pub lives_confirmed: i64,
}

impl SummaryRow {
    pub const HEADERS: [&'static str; 6] = [
        "Week",
        "Clients Going Live",
        "Clients Active",
        "Clients Completed",
        "Lives Active (Not Confirmed)",
        "Lives Confirmed & Complete",
    ];
}

/// Audit view of an [`EnrollmentRow`], used for detail sheets and listings.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct DetailRow {
    #[serde(rename = "ControlId")]
    #[tabled(rename = "ControlId")]
    pub client_id: String,
    #[serde(rename = "Population Type")]
    #[tabled(rename = "Population Type")]
    pub population_type: String,
    #[serde(rename = "Population Size")]
    #[tabled(rename = "Population Size")]
    pub population_size: f64,
    #[serde(rename = "Total OE Count")]
    #[tabled(rename = "Total OE Count")]
    pub total_oe_count: f64,
    #[serde(rename = "Confirmed OE Events")]
    #[tabled(rename = "Confirmed OE Events")]
    pub confirmed_oe_count: f64,
    #[serde(rename = "Start")]
    #[tabled(rename = "Start")]
    pub start_date: NaiveDate,
    #[serde(rename = "End")]
    #[tabled(rename = "End")]
    pub end_date: NaiveDate,
}

impl DetailRow {
    pub const HEADERS: [&'static str; 7] = [
        "ControlId",
        "Population Type",
        "Population Size",
        "Total OE Count",
        "Confirmed OE Events",
        "Start",
        "End",
    ];
}

impl From<&EnrollmentRow> for DetailRow {
    fn from(row: &EnrollmentRow) -> Self {
        DetailRow {
            client_id: row.client_id.clone(),
            population_type: row.population_type.to_string(),
            population_size: row.population_size,
            total_oe_count: row.total_oe_count,
            confirmed_oe_count: row.confirmed_oe_count,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}
