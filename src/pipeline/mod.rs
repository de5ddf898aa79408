//! Pipeline orchestration for reconciliation runs.
//!
//! This module provides the shared load → plan → reconcile → report
//! workflow used by the CLI command handlers.

mod execute;
mod load;
mod output;
mod plan;
mod report_stage;

pub use execute::{execute_plan, BatchOutcome, CompletedRun, FailedRun};
pub use load::{load_lookup, load_run_input, LoadedInput, RunPaths};
pub use output::{auto_detect_format, should_use_color, write_output, OutputTarget};
pub use plan::{build_plan, output_suffix, RunSpec};
pub use report_stage::{output_batch, output_single, report_metadata};

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A score table or lookup file could not be loaded
    #[error("Load failed for {label}: {source}")]
    LoadFailed {
        label: String,
        #[source]
        source: crate::error::TwoStateError,
    },

    /// The engine rejected a run's inputs
    #[error("Reconciliation failed for {label}: {source}")]
    ReconcileFailed {
        label: String,
        #[source]
        source: crate::error::TwoStateError,
    },

    /// Nothing to run after applying target and score filters
    #[error("No runs planned: {reason}")]
    EmptyPlan { reason: String },

    /// Report generation or output failed
    #[error("Report failed: {source}")]
    ReportFailed {
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for scripted use
pub mod exit_codes {
    /// Success - every run ranked at least one group (or no --fail-on-empty)
    pub const SUCCESS: i32 = 0;
    /// A run ranked no groups and --fail-on-empty was set
    pub const EMPTY_RANKING: i32 = 1;
    /// Some batch runs failed and --continue-on-error kept the rest going
    pub const PARTIAL_FAILURE: i32 = 2;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::EMPTY_RANKING, 1);
        assert_eq!(exit_codes::PARTIAL_FAILURE, 2);
        assert_eq!(exit_codes::ERROR, 3);
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::EmptyPlan {
            reason: "no targets configured".to_string(),
        };
        assert_eq!(err.to_string(), "No runs planned: no targets configured");
    }
}
