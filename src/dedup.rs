//! One row per client, chosen by population-type priority.

use crate::types::EnrollmentRow;

/// Keep at most one row per `client_id`.
///
/// Rows are stably sorted by (client id, population priority) and the first
/// row of each client wins, so Active beats COBRA beats Retiree beats any
/// other type, and equal priorities fall back to input order. The result is
/// ordered by client id.
pub fn dedupe_clients(rows: &[EnrollmentRow]) -> Vec<EnrollmentRow> {
    let mut ranked: Vec<&EnrollmentRow> = rows.iter().collect();
    ranked.sort_by(|a, b| {
        a.client_id
            .cmp(&b.client_id)
            .then_with(|| {
                a.population_type
                    .priority_rank()
                    .cmp(&b.population_type.priority_rank())
            })
    });
    ranked.dedup_by(|later, kept| later.client_id == kept.client_id);
    ranked.into_iter().cloned().collect()
}

/// Put rows back into worksheet order.
pub fn restore_source_order(mut rows: Vec<EnrollmentRow>) -> Vec<EnrollmentRow> {
    rows.sort_by_key(|r| r.source_row);
    rows
}
