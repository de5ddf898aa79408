//! JSON report generator.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, RunReport};
use crate::model::GroupResult;
use crate::scoring::{Mode, RunDiagnostics};
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Whether to only include counts, not rows
    summary_only: bool,
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            summary_only: false,
            pretty: true,
        }
    }

    /// Create a summary-only reporter
    #[must_use]
    pub const fn summary_only() -> Self {
        Self {
            summary_only: true,
            pretty: true,
        }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn run<'a>(&self, report: &RunReport<'a>, config: &ReportConfig) -> JsonRun<'a> {
        let run = report.reconciliation;
        let metadata = report.metadata;
        let results = if self.summary_only {
            Vec::new()
        } else {
            config
                .rows(run)
                .iter()
                .enumerate()
                .map(|(i, result)| {
                    let best = result.best_cell();
                    JsonRow {
                        rank: i + 1,
                        result,
                        best_score: best.map(|c| c.best_score),
                        best_source: best.map(|c| c.key.source_label()),
                    }
                })
                .collect()
        };

        JsonRun {
            target: metadata.target.clone(),
            score_type: metadata.score_type.clone(),
            mode: run.mode,
            balance: metadata.balance,
            fingerprint: metadata.fingerprint.clone(),
            summary: JsonSummary {
                ranked: run.results.len(),
                dropped_records: run.diagnostics.dropped.len(),
                omitted_groups: run.diagnostics.omitted.len(),
                ambiguous_pairings: run.diagnostics.ambiguous.len(),
            },
            results,
            diagnostics: (!self.summary_only).then_some(&run.diagnostics),
        }
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, ReportError> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_run_report(
        &self,
        report: &RunReport<'_>,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let document = JsonRunReport {
            metadata: JsonReportMetadata::new(),
            run: self.run(report, config),
        };
        self.serialize(&document)
    }

    fn generate_batch_report(
        &self,
        reports: &[RunReport<'_>],
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let document = JsonBatchReport {
            metadata: JsonReportMetadata::new(),
            runs: reports.iter().map(|r| self.run(r, config)).collect(),
        };
        self.serialize(&document)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

// JSON structures

#[derive(Serialize)]
struct JsonRunReport<'a> {
    metadata: JsonReportMetadata,
    #[serde(flatten)]
    run: JsonRun<'a>,
}

#[derive(Serialize)]
struct JsonBatchReport<'a> {
    metadata: JsonReportMetadata,
    runs: Vec<JsonRun<'a>>,
}

#[derive(Serialize)]
struct JsonReportMetadata {
    tool: ToolInfo,
    generated_at: String,
}

impl JsonReportMetadata {
    fn new() -> Self {
        Self {
            tool: ToolInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct JsonRun<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_type: Option<String>,
    mode: Mode,
    balance: bool,
    fingerprint: String,
    summary: JsonSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    results: Vec<JsonRow<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<&'a RunDiagnostics>,
}

#[derive(Serialize)]
struct JsonSummary {
    ranked: usize,
    dropped_records: usize,
    omitted_groups: usize,
    ambiguous_pairings: usize,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    rank: usize,
    #[serde(flatten)]
    result: &'a GroupResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_source: Option<String>,
}
