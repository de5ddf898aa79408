//! CSV report generator.
//!
//! Writes one row per ranked group using the column names of the assessment
//! tables, suitable for spreadsheet import and downstream plotting.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, RunReport};
use crate::model::{CellKey, GroupResult};

/// Columns written for every run.
pub const CSV_HEADERS: [&str; 10] = [
    "Group",
    "Group_Name",
    "Combined_Score",
    "Best_v1_ref",
    "Best_v2_ref",
    "V1_Model_For_Combined_Score",
    "V2_Model_For_Combined_Score",
    "Pairing",
    "Best_Score",
    "Best_Source",
];

const BALANCE_HEADERS: [&str; 2] = ["Balance", "TSBI_Score"];

/// CSV report generator.
pub struct CsvReporter;

impl CsvReporter {
    pub fn new() -> Self {
        Self
    }

    fn headers(balance: bool, show_cells: bool) -> Vec<String> {
        let mut headers: Vec<String> = CSV_HEADERS.iter().map(|h| (*h).to_string()).collect();
        if balance {
            headers.extend(BALANCE_HEADERS.iter().map(|h| (*h).to_string()));
        }
        if show_cells {
            for key in CellKey::ALL {
                headers.push(format!("{key}_Score"));
                headers.push(format!("{key}_Model"));
            }
        }
        headers
    }

    fn row(result: &GroupResult, balance: bool, show_cells: bool) -> Vec<String> {
        let best = result.best_cell();
        let mut fields = vec![
            result.group_label.clone(),
            result.group_name.clone(),
            result.combined_score.to_string(),
            result.best_ref_a.to_string(),
            result.best_ref_b.map(|b| b.to_string()).unwrap_or_default(),
            result.model_for_a.to_string(),
            result
                .model_for_b
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            result.pairing.map(|p| p.to_string()).unwrap_or_default(),
            best.map(|c| c.best_score.to_string()).unwrap_or_default(),
            best.map(|c| c.key.source_label()).unwrap_or_default(),
        ];
        if balance {
            fields.push(result.balance.map(|b| b.to_string()).unwrap_or_default());
            fields.push(result.tsbi_score.map(|t| t.to_string()).unwrap_or_default());
        }
        if show_cells {
            for cell in &result.cells {
                fields.push(cell.best_score.to_string());
                fields.push(cell.best_model.map(|m| m.to_string()).unwrap_or_default());
            }
        }
        fields
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReporter {
    fn generate_run_report(
        &self,
        report: &RunReport<'_>,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let balance = report.metadata.balance;
        let mut writer = ::csv::WriterBuilder::new()
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(Self::headers(balance, config.show_cells))?;
        for result in config.rows(report.reconciliation) {
            writer.write_record(Self::row(result, balance, config.show_cells))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::SerializationError(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    /// Several runs cannot share one header row, so batch CSV output is
    /// only available one file per run.
    fn generate_batch_report(
        &self,
        reports: &[RunReport<'_>],
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        match reports {
            [single] => self.generate_run_report(single, config),
            _ => Err(ReportError::UnsupportedFormat(
                "csv output for several runs needs an output directory".to_string(),
            )),
        }
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}
