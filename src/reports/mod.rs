//! Report generation for reconciliation runs.
//!
//! This module provides multiple output formats for ranked results:
//! - Table: Aligned ranking for the terminal, optionally colored
//! - Summary: One line per run, for batch overviews
//! - JSON: Structured data with metadata and diagnostics
//! - CSV: Spreadsheet-ready rows using the assessment column names

mod csv;
mod json;
mod summary;
mod types;

pub use self::csv::{CsvReporter, CSV_HEADERS};
pub use json::JsonReporter;
pub use summary::{SummaryReporter, TableReporter};
pub use types::{ReportConfig, ReportFormat, ReportMetadata, RunReport};

use std::io::Write;
use thiserror::Error;

use crate::error::{ReportErrorKind, TwoStateError};

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<::csv::Error> for ReportError {
    fn from(err: ::csv::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<ReportError> for TwoStateError {
    fn from(err: ReportError) -> Self {
        let kind = match err {
            ReportError::UnsupportedFormat(format) => ReportErrorKind::UnsupportedFormat(format),
            ReportError::SerializationError(message) => {
                ReportErrorKind::SerializationError(message)
            }
            other => ReportErrorKind::WriteFailed(other.to_string()),
        };
        TwoStateError::report("rendering report", kind)
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report for one run
    fn generate_run_report(
        &self,
        report: &RunReport<'_>,
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Generate one report covering several runs.
    ///
    /// The default concatenates the per-run reports.
    fn generate_batch_report(
        &self,
        reports: &[RunReport<'_>],
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let parts = reports
            .iter()
            .map(|r| self.generate_run_report(r, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join("\n\n"))
    }

    /// Write report to a writer
    fn write_run_report(
        &self,
        report: &RunReport<'_>,
        config: &ReportConfig,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let rendered = self.generate_run_report(report, config)?;
        writer.write_all(rendered.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator + Send + Sync> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control.
///
/// `Auto` must be resolved by the caller; here it falls back to CSV.
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
) -> Box<dyn ReportGenerator + Send + Sync> {
    match format {
        ReportFormat::Summary => {
            if use_color {
                Box::new(SummaryReporter::new())
            } else {
                Box::new(SummaryReporter::new().no_color())
            }
        }
        ReportFormat::Table => {
            if use_color {
                Box::new(TableReporter::new())
            } else {
                Box::new(TableReporter::new().no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Csv | ReportFormat::Auto => Box::new(CsvReporter::new()),
    }
}
