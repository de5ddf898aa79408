//! Report type definitions.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scoring::{Mode, Reconciliation};
use crate::utils::format_fingerprint;

/// Output format for reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Auto-detect: table if TTY, CSV otherwise
    #[default]
    Auto,
    /// Aligned ranking table for terminal (colored)
    Table,
    /// One line per run
    Summary,
    /// Structured JSON output with diagnostics
    Json,
    /// CSV with the assessment column names
    Csv,
}

impl ReportFormat {
    /// File extension for per-run output files.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv | Self::Auto => "csv",
            Self::Table | Self::Summary => "txt",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Auto => write!(f, "auto"),
            ReportFormat::Table => write!(f, "table"),
            ReportFormat::Summary => write!(f, "summary"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Metadata included in reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Tool version
    pub tool_version: String,
    /// Generation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Assessment target, e.g. `T1228`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Score type, e.g. `GDT_TS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_type: Option<String>,
    /// Pairing mode the run used
    pub mode: Mode,
    /// Whether balance columns were computed
    pub balance: bool,
    /// Hex fingerprint of the ranked rows
    pub fingerprint: String,
}

impl ReportMetadata {
    pub fn new() -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        }
    }

    /// Metadata describing `reconciliation`.
    pub fn for_run(reconciliation: &Reconciliation, balance: bool) -> Self {
        Self {
            mode: reconciliation.mode,
            balance,
            fingerprint: format_fingerprint(reconciliation.fingerprint()),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn score_type(mut self, score_type: impl Into<String>) -> Self {
        self.score_type = Some(score_type.into());
        self
    }

    /// `"{target}/{score}"`, or whichever of the two is known.
    pub fn label(&self) -> String {
        match (self.target.as_deref(), self.score_type.as_deref()) {
            (Some(t), Some(s)) => format!("{t}/{s}"),
            (Some(x), None) | (None, Some(x)) => x.to_string(),
            (None, None) => "run".to_string(),
        }
    }
}

/// One reconciliation plus the metadata a report needs to describe it.
#[derive(Debug, Clone, Copy)]
pub struct RunReport<'a> {
    pub metadata: &'a ReportMetadata,
    pub reconciliation: &'a Reconciliation,
}

impl<'a> RunReport<'a> {
    pub fn new(metadata: &'a ReportMetadata, reconciliation: &'a Reconciliation) -> Self {
        Self {
            metadata,
            reconciliation,
        }
    }
}

/// Options shared by all reporters
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// Maximum rows per run (None for all)
    pub max_rows: Option<usize>,
    /// Include the four per-cell scores
    pub show_cells: bool,
    /// Include record and group diagnostics
    pub include_diagnostics: bool,
}

impl ReportConfig {
    /// Rows of `reconciliation` to render.
    pub fn rows<'r>(&self, reconciliation: &'r Reconciliation) -> &'r [crate::model::GroupResult] {
        let rows = reconciliation.results.as_slice();
        match self.max_rows {
            Some(max) if max < rows.len() => &rows[..max],
            _ => rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_round_trips_through_yaml() {
        let format: ReportFormat = serde_yaml_ng::from_str("auto").unwrap();
        assert_eq!(format, ReportFormat::Auto);
        let format: ReportFormat = serde_yaml_ng::from_str("csv").unwrap();
        assert_eq!(format, ReportFormat::Csv);
        assert_eq!(ReportFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_metadata_label() {
        let metadata = ReportMetadata::new().target("T1228").score_type("GDT_TS");
        assert_eq!(metadata.label(), "T1228/GDT_TS");
        assert_eq!(ReportMetadata::new().score_type("TMscore").label(), "TMscore");
        assert!(!ReportMetadata::new().tool_version.is_empty());
    }

    #[test]
    fn test_extension() {
        assert_eq!(ReportFormat::Json.extension(), "json");
        assert_eq!(ReportFormat::Auto.extension(), "csv");
    }
}
