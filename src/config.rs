//! Report configuration: sheet name, lives basis and column fallbacks.
//!
//! Values come from built-in defaults, optionally replaced by a TOML file.
//! Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Configuration file picked up from the working directory when no explicit
/// `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "oe-weekly.toml";

pub const DEFAULT_SHEET_NAME: &str = "OE Counts";

/// Which rows feed the lives metrics of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LivesBasis {
    /// Every filtered row counts, so a client with several population
    /// segments contributes each of them.
    #[default]
    Rows,
    /// Only the row kept by client deduplication counts.
    Clients,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub sheet_name: String,
    pub lives_basis: LivesBasis,
    pub columns: ColumnCandidates,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            lives_basis: LivesBasis::default(),
            columns: ColumnCandidates::default(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ReportError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Explicit file if given, else `oe-weekly.toml` in `dir` if present,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let fallback: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            log::debug!("Using configuration from {}", fallback.display());
            Self::from_file(&fallback)
        } else {
            Ok(Self::default())
        }
    }
}

/// Header names accepted for each logical field, highest priority first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnCandidates {
    pub client_id: Vec<String>,
    pub population_type: Vec<String>,
    pub population_size: Vec<String>,
    pub total_oe_count: Vec<String>,
    pub confirmed_oe_count: Vec<String>,
    pub start_date: Vec<String>,
    pub end_date: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnCandidates {
    fn default() -> Self {
        Self {
            client_id: names(&["ControlId", "Control Id", "Control ID", "Client ID"]),
            population_type: names(&["Population Type", "Pop Type"]),
            population_size: names(&["Population Size", "Pop Size"]),
            total_oe_count: names(&["Total OE Count", "OE Count"]),
            confirmed_oe_count: names(&["Confirmed OE Events", "Confirmed OE Count"]),
            start_date: names(&[
                "Window Start from CDR",
                "Window Start",
                "OE Window Start",
                "Start Date",
            ]),
            end_date: names(&[
                "Window End from CDR",
                "Window End",
                "OE Window End",
                "End Date",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ReportConfig = toml::from_str(
            r#"
            lives_basis = "clients"

            [columns]
            start_date = ["Kickoff"]
            "#,
        )
        .unwrap();

        assert_eq!(config.sheet_name, "OE Counts");
        assert_eq!(config.lives_basis, LivesBasis::Clients);
        assert_eq!(config.columns.start_date, vec!["Kickoff".to_string()]);
        assert_eq!(
            config.columns.end_date,
            ColumnCandidates::default().end_date
        );
    }

    #[test]
    fn discover_reads_file_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "sheet_name = \"Counts\"\n").unwrap();

        let config = ReportConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.sheet_name, "Counts");
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "lives_basis = 3\n").unwrap();

        let err = ReportConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ReportError::Config { .. }));
    }
}
