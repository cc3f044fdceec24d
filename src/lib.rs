//! Rolling three-week open enrollment summary.
//!
//! Reads a spreadsheet export of client enrollment windows, normalizes its
//! loosely named columns, and reports per week (last, this, next) how many
//! clients go live, are active, or have completed, together with the lives
//! still to be confirmed and those already confirmed.

pub mod config;
pub mod dedup;
pub mod error;
pub mod filters;
pub mod loader;
pub mod metrics;
pub mod normalize;
pub mod output;
pub mod projection;
pub mod reports;
pub mod types;
pub mod util;
pub mod weeks;

#[cfg(test)]
mod test_support;

pub use config::{ColumnCandidates, LivesBasis, ReportConfig};
pub use error::{ReportError, Result};
pub use reports::{client_listing, generate_summary, ClientListing, WeeklySummary};
pub use types::{EnrollmentRow, LoadReport, PopulationType, SummaryRow, WeekSlot, WeekWindow};
pub use weeks::{week_ranges, WeekMode};
