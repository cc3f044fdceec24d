// Schema normalization: raw worksheet rows -> `EnrollmentRow`s.
//
// Exports from different periods name their columns differently, so every
// field is looked up through an ordered list of candidate headers and each
// row takes the first candidate column that actually holds a value.
use chrono::NaiveDate;

use crate::config::ColumnCandidates;
use crate::error::{ReportError, Result};
use crate::types::{EnrollmentRow, LoadReport, PopulationType, RawTable};
use crate::util::{cell_date, cell_number, cell_text, count_or_zero, first_present, title_case};

/// Column indices resolved for each field, in fallback priority order.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    pub client_id: Vec<usize>,
    pub population_type: Vec<usize>,
    pub population_size: Vec<usize>,
    pub total_oe_count: Vec<usize>,
    pub confirmed_oe_count: Vec<usize>,
    pub start_date: Vec<usize>,
    pub end_date: Vec<usize>,
}

impl ColumnMap {
    /// Resolve header positions. Only the client id column is mandatory.
    pub fn resolve(table: &RawTable, columns: &ColumnCandidates) -> Result<Self> {
        let client_id = table.candidate_columns(&columns.client_id);
        if client_id.is_empty() {
            return Err(ReportError::MissingColumn {
                field: "client id",
                candidates: columns.client_id.clone(),
            });
        }
        let map = ColumnMap {
            client_id,
            population_type: table.candidate_columns(&columns.population_type),
            population_size: table.candidate_columns(&columns.population_size),
            total_oe_count: table.candidate_columns(&columns.total_oe_count),
            confirmed_oe_count: table.candidate_columns(&columns.confirmed_oe_count),
            start_date: table.candidate_columns(&columns.start_date),
            end_date: table.candidate_columns(&columns.end_date),
        };
        if map.start_date.is_empty() && map.end_date.is_empty() {
            log::warn!("No window date columns found; every row will be dropped");
        }
        Ok(map)
    }
}

/// Map a free-text population type onto the known categories.
pub fn normalize_population_type(raw: Option<&str>) -> PopulationType {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return PopulationType::Other("Unknown".to_string());
    };
    let key: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if key.contains("active") || key.contains("act") {
        PopulationType::Active
    } else if key.contains("cobra") || key.contains("cob") {
        PopulationType::Cobra
    } else if key.contains("ret") {
        PopulationType::Retiree
    } else {
        PopulationType::Other(title_case(raw))
    }
}

/// Normalize every data row of `table`.
///
/// Fully blank rows are skipped. Rows without a client id, without any
/// resolvable date, or whose end date precedes the start date are left out
/// and tallied in the [`LoadReport`].
pub fn normalize_rows(
    table: &RawTable,
    columns: &ColumnCandidates,
) -> Result<(Vec<EnrollmentRow>, LoadReport)> {
    let map = ColumnMap::resolve(table, columns)?;
    let mut report = LoadReport::default();
    let mut out = Vec::with_capacity(table.rows.len());

    for idx in 0..table.rows.len() {
        if table.is_blank_row(idx) {
            continue;
        }
        report.total_rows += 1;
        let text = |cols: &[usize]| first_present(cols, |c| cell_text(table.cell(idx, *c)));
        let number = |cols: &[usize]| first_present(cols, |c| cell_number(table.cell(idx, *c)));
        let date = |cols: &[usize]| first_present(cols, |c| cell_date(table.cell(idx, *c)));

        let Some(client_id) = text(&map.client_id) else {
            report.missing_client_id += 1;
            continue;
        };

        let (start_date, end_date) = match resolve_window(date(&map.start_date), date(&map.end_date)) {
            Some(window) => window,
            None => {
                report.missing_dates += 1;
                continue;
            }
        };
        if end_date < start_date {
            report.inverted_windows += 1;
            continue;
        }

        out.push(EnrollmentRow {
            source_row: table.source_row(idx),
            client_id,
            population_type: normalize_population_type(text(&map.population_type).as_deref()),
            population_size: count_or_zero(number(&map.population_size)),
            total_oe_count: count_or_zero(number(&map.total_oe_count)),
            confirmed_oe_count: count_or_zero(number(&map.confirmed_oe_count)),
            start_date,
            end_date,
        });
    }

    report.retained_rows = out.len();
    Ok((out, report))
}

/// A missing bound mirrors the present one, giving a one-day window.
fn resolve_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    match (start, end) {
        (Some(s), Some(e)) => Some((s, e)),
        (Some(s), None) => Some((s, s)),
        (None, Some(e)) => Some((e, e)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn table_from_strings(headers: &[&str], rows: &[Vec<&str>]) -> RawTable {
        RawTable {
            header_row: 1,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| {
                    r.iter()
                        .map(|v| {
                            if v.is_empty() {
                                CellValue::Empty
                            } else {
                                CellValue::Text(v.to_string())
                            }
                        })
                        .collect()
                })
                .collect(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const HEADERS: [&str; 8] = [
        "ControlId",
        "Population Type",
        "Population Size",
        "Total OE Count",
        "Confirmed OE Events",
        "Window Start from CDR",
        "Window End from CDR",
        "Window Start",
    ];

    #[test]
    fn coalesces_fallback_date_columns() {
        let table = table_from_strings(
            &HEADERS,
            &[
                vec!["C1", "Active", "10", "", "", "2025-10-27", "2025-11-02", "2025-01-01"],
                vec!["C2", "Active", "10", "", "", "No date configured", "2025-11-02", "2025-10-20"],
            ],
        );
        let (rows, report) = normalize_rows(&table, &ColumnCandidates::default()).unwrap();

        assert_eq!(report.retained_rows, 2);
        // Primary column wins where it has a value.
        assert_eq!(rows[0].start_date, d(2025, 10, 27));
        // Fallback fills in only where the primary is blank.
        assert_eq!(rows[1].start_date, d(2025, 10, 20));
    }

    #[test]
    fn mirrors_missing_bound() {
        let table = table_from_strings(
            &HEADERS,
            &[
                vec!["C1", "Active", "1", "", "", "2025-10-27", "", ""],
                vec!["C2", "Active", "1", "", "", "", "2025-11-02", ""],
            ],
        );
        let (rows, _) = normalize_rows(&table, &ColumnCandidates::default()).unwrap();
        assert_eq!((rows[0].start_date, rows[0].end_date), (d(2025, 10, 27), d(2025, 10, 27)));
        assert_eq!((rows[1].start_date, rows[1].end_date), (d(2025, 11, 2), d(2025, 11, 2)));
    }

    #[test]
    fn drops_inverted_and_undated_rows() {
        let table = table_from_strings(
            &HEADERS,
            &[
                vec!["C1", "Active", "1", "", "", "2025-11-02", "2025-10-27", ""],
                vec!["C2", "Active", "1", "", "", "", "", ""],
                vec!["", "Active", "1", "", "", "2025-10-27", "2025-11-02", ""],
                vec!["", "", "", "", "", "", "", ""],
                vec!["C4", "Active", "1", "", "", "2025-10-27", "2025-11-02", ""],
            ],
        );
        let (rows, report) = normalize_rows(&table, &ColumnCandidates::default()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].client_id, "C4");
        assert_eq!(rows[0].source_row, 6);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.inverted_windows, 1);
        assert_eq!(report.missing_dates, 1);
        assert_eq!(report.missing_client_id, 1);
        assert!(rows.iter().all(|r| r.start_date <= r.end_date));
    }

    #[test]
    fn source_rows_follow_a_lowered_header() {
        let mut table = table_from_strings(
            &HEADERS,
            &[
                vec!["", "", "", "", "", "", "", ""],
                vec!["C1", "Active", "1", "", "", "2025-10-27", "2025-11-02", ""],
            ],
        );
        table.header_row = 3;
        let (rows, _) = normalize_rows(&table, &ColumnCandidates::default()).unwrap();
        assert_eq!(rows[0].source_row, 5);
    }

    #[test]
    fn missing_client_column_is_fatal() {
        let table = table_from_strings(&["Client Name", "Window Start"], &[vec!["Acme", "2025-10-27"]]);
        let err = normalize_rows(&table, &ColumnCandidates::default()).unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn { field: "client id", .. }));
    }

    #[test]
    fn headers_match_loosely() {
        let table = table_from_strings(
            &[" controlid ", "WINDOW START"],
            &[vec!["C9", "2025-10-27"]],
        );
        let (rows, _) = normalize_rows(&table, &ColumnCandidates::default()).unwrap();
        assert_eq!(rows[0].client_id, "C9");
        assert_eq!(rows[0].population_type.as_str(), "Unknown");
        assert_eq!(rows[0].population_size, 0.0);
    }

    #[test]
    fn lenient_numbers_default_to_zero() {
        let table = table_from_strings(
            &HEADERS,
            &[vec!["C1", "Active", "n/a", "1,200", "-3", "2025-10-27", "", ""]],
        );
        let (rows, _) = normalize_rows(&table, &ColumnCandidates::default()).unwrap();
        assert_eq!(rows[0].population_size, 0.0);
        assert_eq!(rows[0].total_oe_count, 1200.0);
        assert_eq!(rows[0].confirmed_oe_count, 0.0);
    }

    #[test]
    fn population_types_are_bucketed() {
        assert_eq!(normalize_population_type(Some(" ACTIVE ")), PopulationType::Active);
        assert_eq!(normalize_population_type(Some("act")), PopulationType::Active);
        assert_eq!(normalize_population_type(Some("Cobra")), PopulationType::Cobra);
        assert_eq!(normalize_population_type(Some("COB")), PopulationType::Cobra);
        assert_eq!(normalize_population_type(Some("Retirees")), PopulationType::Retiree);
        assert_eq!(
            normalize_population_type(Some("part time")),
            PopulationType::Other("Part Time".into())
        );
        assert_eq!(
            normalize_population_type(None),
            PopulationType::Other("Unknown".into())
        );
        assert_eq!(
            normalize_population_type(Some("  ")),
            PopulationType::Other("Unknown".into())
        );
    }
}
