//! Reconciliation stage.
//!
//! Loads every planned run, then reconciles them in parallel.

use crate::config::AppConfig;
use crate::model::GroupNameLookup;
use crate::scoring::{run_batch, BatchRun, Reconciliation};

use super::{exit_codes, load_run_input, PipelineError, RunSpec};

/// A run that produced a ranking.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub spec: RunSpec,
    pub reconciliation: Reconciliation,
    pub skipped_rows: usize,
}

/// A run that could not be loaded or reconciled.
#[derive(Debug, Clone)]
pub struct FailedRun {
    pub label: String,
    pub error: String,
}

/// Everything a batch produced, in plan order.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub completed: Vec<CompletedRun>,
    pub failed: Vec<FailedRun>,
}

impl BatchOutcome {
    /// Exit code for this outcome.
    ///
    /// Failed runs take precedence over empty rankings.
    pub fn exit_code(&self, fail_on_empty: bool) -> i32 {
        if !self.failed.is_empty() {
            exit_codes::PARTIAL_FAILURE
        } else if fail_on_empty && self.completed.iter().any(|r| r.reconciliation.is_empty()) {
            exit_codes::EMPTY_RANKING
        } else {
            exit_codes::SUCCESS
        }
    }
}

/// Load and reconcile every run in `plan`.
///
/// With `behavior.continue_on_error`, failing runs are recorded and the rest
/// go ahead; otherwise the first failure aborts the batch.
pub fn execute_plan(
    config: &AppConfig,
    plan: Vec<RunSpec>,
    lookup: &GroupNameLookup,
) -> Result<BatchOutcome, PipelineError> {
    let quiet = config.behavior.quiet;
    let keep_going = config.behavior.continue_on_error;
    let mut outcome = BatchOutcome::default();

    let mut loaded = Vec::with_capacity(plan.len());
    for spec in plan {
        let label = spec.label();
        match load_run_input(&spec.paths, &spec.score, &config.data.columns, quiet) {
            Ok(input) => loaded.push((spec, input.skipped_rows, input.input)),
            Err(source) if keep_going => {
                tracing::warn!(run = %label, "Skipping run: {source}");
                outcome.failed.push(FailedRun {
                    label,
                    error: source.to_string(),
                });
            }
            Err(source) => return Err(PipelineError::LoadFailed { label, source }),
        }
    }

    let (specs, runs): (Vec<_>, Vec<_>) = loaded
        .into_iter()
        .map(|(spec, skipped, input)| {
            let run = BatchRun {
                label: spec.label(),
                engine: spec.engine,
                input,
            };
            ((spec, skipped), run)
        })
        .unzip();

    if !quiet {
        tracing::info!(runs = runs.len(), "Reconciling");
    }
    let results = run_batch(&runs, lookup);

    for ((spec, skipped_rows), result) in specs.into_iter().zip(results) {
        match result {
            Ok(reconciliation) => outcome.completed.push(CompletedRun {
                spec,
                reconciliation,
                skipped_rows,
            }),
            Err(source) if keep_going => {
                let label = spec.label();
                tracing::warn!(run = %label, "Run failed: {source}");
                outcome.failed.push(FailedRun {
                    label,
                    error: source.to_string(),
                });
            }
            Err(source) => {
                return Err(PipelineError::ReconcileFailed {
                    label: spec.label(),
                    source,
                })
            }
        }
    }

    Ok(outcome)
}
