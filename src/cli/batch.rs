//! Batch command handler.
//!
//! Implements the `batch` subcommand: every configured (target, score type)
//! pair, reconciled in parallel.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::pipeline::{build_plan, execute_plan, load_lookup, output_batch};

use super::ensure_valid;

/// Which part of the configured batch to run.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    /// Targets to run; all configured targets when empty
    pub targets: Vec<String>,
    /// Score types replacing each target's list when non-empty
    pub scores: Vec<String>,
    pub lookup: Option<PathBuf>,
}

/// Run the batch command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_batch(config: &AppConfig, request: &BatchRequest) -> Result<i32> {
    ensure_valid(config)?;
    let quiet = config.behavior.quiet;

    let plan = build_plan(config, &request.targets, &request.scores)?;
    if !quiet {
        tracing::info!("Planned {} runs", plan.len());
    }

    let lookup = load_lookup(config, request.lookup.as_deref())
        .context("Failed to load group-name lookup")?;
    let outcome = execute_plan(config, plan, &lookup)?;

    if !outcome.completed.is_empty() {
        output_batch(config, &outcome.completed)?;
    }

    for failed in &outcome.failed {
        tracing::error!(run = %failed.label, "{}", failed.error);
    }
    for run in outcome.completed.iter().filter(|r| r.reconciliation.is_empty()) {
        tracing::warn!(run = %run.spec.label(), "No group has a positive combined score");
    }
    if !quiet {
        let skipped: usize = outcome.completed.iter().map(|r| r.skipped_rows).sum();
        tracing::info!(
            completed = outcome.completed.len(),
            failed = outcome.failed.len(),
            skipped_rows = skipped,
            "Batch finished"
        );
    }

    Ok(outcome.exit_code(config.behavior.fail_on_empty))
}
