// Forward estimate of next week's lives active.
//
// Future windows are usually not confirmed yet when the export is taken, so
// the naive filter result for next week undercounts. The estimate is the
// lives carried over from clients already in progress plus, for every client
// starting next week, the sum of its population segments with the retiree
// segment capped at the active one.
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::LivesBasis;
use crate::filters::{active, going_live};
use crate::metrics::{lives_active, lives_rows};
use crate::types::{EnrollmentRow, PopulationType, WeekWindow};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientContribution {
    pub client_id: String,
    pub active: f64,
    pub cobra: f64,
    pub retiree: f64,
    pub other: f64,
    /// Rounded total after the retiree cap.
    pub lives: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub carried_over: i64,
    pub new_clients: i64,
    pub total: i64,
    pub contributions: Vec<ClientContribution>,
}

/// Expected size of one population segment.
fn segment_estimate(row: &EnrollmentRow) -> f64 {
    if row.population_size > 0.0 {
        row.population_size
    } else {
        row.total_oe_count
    }
}

/// Bucket one new client's rows by population type and apply the retiree cap.
pub fn client_contribution(client_id: &str, rows: &[&EnrollmentRow]) -> ClientContribution {
    let mut c = ClientContribution {
        client_id: client_id.to_string(),
        ..ClientContribution::default()
    };
    for row in rows {
        let estimate = segment_estimate(row);
        match row.population_type {
            PopulationType::Active => c.active += estimate,
            PopulationType::Cobra => c.cobra += estimate,
            PopulationType::Retiree => c.retiree += estimate,
            PopulationType::Other(_) => c.other += estimate,
        }
    }
    // Retiree lives cannot exceed active lives for the same client.
    let retiree = if c.active > 0.0 && c.retiree > c.active {
        c.active
    } else {
        c.retiree
    };
    c.lives = (c.active + retiree + c.cobra + c.other).round() as i64;
    c
}

pub fn project_next_week(
    rows: &[EnrollmentRow],
    next: &WeekWindow,
    basis: LivesBasis,
) -> Projection {
    let continuing: Vec<EnrollmentRow> = active(rows, next)
        .into_iter()
        .filter(|r| r.start_date < next.start)
        .collect();
    let carried_over = lives_active(&lives_rows(&continuing, basis));

    let new_rows = going_live(rows, next);
    let mut by_client: BTreeMap<&str, Vec<&EnrollmentRow>> = BTreeMap::new();
    for r in &new_rows {
        by_client.entry(r.client_id.as_str()).or_default().push(r);
    }
    let contributions: Vec<ClientContribution> = by_client
        .iter()
        .map(|(client_id, group)| client_contribution(client_id, group))
        .collect();
    let new_clients: i64 = contributions.iter().map(|c| c.lives).sum();

    Projection {
        carried_over,
        new_clients,
        total: carried_over + new_clients,
        contributions,
    }
}
