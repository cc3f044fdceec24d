use serde::Serialize;

use crate::config::LivesBasis;
use crate::dedup::{dedupe_clients, restore_source_order};
use crate::filters::{active, completed, going_live};
use crate::metrics::{lives_active, lives_confirmed, lives_rows, unique_client_count};
use crate::projection::{project_next_week, Projection};
use crate::types::{DetailRow, EnrollmentRow, SummaryRow, WeekSlot, WeekWindow};

/// Filtered row sets behind one summary line, kept for audit export.
#[derive(Debug, Clone)]
pub struct WindowDetail {
    pub window: WeekWindow,
    pub going_live: Vec<DetailRow>,
    pub active: Vec<DetailRow>,
    pub completed: Vec<DetailRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub windows: Vec<WeekWindow>,
    pub lives_basis: LivesBasis,
    pub rows: Vec<SummaryRow>,
    /// Next week's lives active before the projection replaced it.
    pub naive_next_lives_active: i64,
    pub projection: Projection,
    #[serde(skip)]
    pub details: Vec<WindowDetail>,
}

#[derive(Debug, Clone)]
pub struct ClientListing {
    pub window: WeekWindow,
    pub going_live: Vec<DetailRow>,
    pub active: Vec<DetailRow>,
}

/// Detail rows sorted by client, population type, then the date that put the
/// row in its category.
fn detail_rows<F>(rows: &[EnrollmentRow], date_of: F) -> Vec<DetailRow>
where
    F: Fn(&EnrollmentRow) -> chrono::NaiveDate,
{
    let mut sorted: Vec<&EnrollmentRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        a.client_id
            .cmp(&b.client_id)
            .then_with(|| a.population_type.as_str().cmp(b.population_type.as_str()))
            .then_with(|| date_of(*a).cmp(&date_of(*b)))
    });
    sorted.into_iter().map(DetailRow::from).collect()
}

/// Naive metrics for one window, plus its detail tables.
pub fn window_report(
    rows: &[EnrollmentRow],
    window: &WeekWindow,
    basis: LivesBasis,
) -> (SummaryRow, WindowDetail) {
    let going = going_live(rows, window);
    let in_window = active(rows, window);
    let done = completed(rows, window);

    let lives = lives_rows(&in_window, basis);
    let summary = SummaryRow {
        week: window.range_label(),
        clients_going_live: unique_client_count(&going),
        clients_active: unique_client_count(&in_window),
        clients_completed: unique_client_count(&done),
        lives_active: lives_active(&lives),
        lives_confirmed: lives_confirmed(&lives, window.end),
    };
    let detail = WindowDetail {
        window: *window,
        going_live: detail_rows(&going, |r| r.start_date),
        active: detail_rows(&in_window, |r| r.start_date),
        completed: detail_rows(&done, |r| r.end_date),
    };
    (summary, detail)
}

/// Build the three-week summary. Next week's lives active is replaced by the
/// forward projection; every other figure is the plain window result.
pub fn generate_summary(
    rows: &[EnrollmentRow],
    windows: &[WeekWindow; 3],
    basis: LivesBasis,
) -> WeeklySummary {
    let mut summary_rows = Vec::with_capacity(windows.len());
    let mut details = Vec::with_capacity(windows.len());
    for window in windows {
        let (row, detail) = window_report(rows, window, basis);
        log::debug!(
            "{} ({}): {} going live, {} active, {} completed",
            window.slot.name(),
            row.week,
            row.clients_going_live,
            row.clients_active,
            row.clients_completed
        );
        summary_rows.push(row);
        details.push(detail);
    }

    let mut naive_next_lives_active = 0;
    let mut projection = Projection::default();
    if let Some(next_idx) = windows.iter().position(|w| w.slot == WeekSlot::Next) {
        projection = project_next_week(rows, &windows[next_idx], basis);
        naive_next_lives_active = summary_rows[next_idx].lives_active;
        log::debug!(
            "Next week lives active: naive {}, projected {} ({} carried over + {} from {} new clients)",
            naive_next_lives_active,
            projection.total,
            projection.carried_over,
            projection.new_clients,
            projection.contributions.len()
        );
        summary_rows[next_idx].lives_active = projection.total;
    }

    WeeklySummary {
        windows: windows.to_vec(),
        lives_basis: basis,
        rows: summary_rows,
        naive_next_lives_active,
        projection,
        details,
    }
}

/// Deduplicated going-live and active clients for `window`, in worksheet
/// order.
pub fn client_listing(rows: &[EnrollmentRow], window: &WeekWindow) -> ClientListing {
    let to_detail = |selected: Vec<EnrollmentRow>| -> Vec<DetailRow> {
        restore_source_order(dedupe_clients(&selected))
            .iter()
            .map(DetailRow::from)
            .collect()
    };
    ClientListing {
        window: *window,
        going_live: to_detail(going_live(rows, window)),
        active: to_detail(active(rows, window)),
    }
}
