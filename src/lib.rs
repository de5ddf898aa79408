//! **Two-state score reconciliation for structure-prediction assessment.**
//!
//! Some assessment targets have two valid reference structures (two
//! conformations, states A and B). Predictors may submit models declared as
//! version 1 or version 2, and every model is scored against both references.
//! `twostate-score` reduces those per-model scores into one combined score per
//! predictor group and ranks the groups, without ever crediting the same
//! score twice.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: Input records ([`ScoreRecord`], [`RecordSet`]), group keys
//!   ([`GroupId`]) and the ranked output row ([`GroupResult`]).
//! - **[`scoring`]**: The [`ReconciliationEngine`]. It builds the four score
//!   cells per group, selects a pairing according to the [`Mode`], assembles
//!   and optionally rescales the combined score, computes the balance index,
//!   and ranks.
//! - **[`ingest`]**: CSV loaders for score tables and the group-name lookup.
//! - **[`reports`]**: Table, summary, JSON and CSV report generators.
//! - **[`pipeline`]**: Batch planning and parallel execution over many
//!   (target, score type) runs.
//! - **[`config`]**: YAML configuration, presets, and validation.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::Path;
//! use twostate_score::ingest::{load_record_set, ColumnMap};
//! use twostate_score::{GroupNameLookup, Mode, ReconciliationEngine, ReferenceState, RunInput};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let columns = ColumnMap::default();
//!     let a = load_record_set(Path::new("T1228_v1_GDT_TS_scores.csv"), ReferenceState::A, "GDT_TS", &columns)?;
//!     let b = load_record_set(Path::new("T1228_v2_GDT_TS_scores.csv"), ReferenceState::B, "GDT_TS", &columns)?;
//!
//!     let engine = ReconciliationEngine::new(Mode::MultiGroup);
//!     let run = engine.reconcile(&RunInput::new(a.set, b.set), &GroupNameLookup::new())?;
//!
//!     for (rank, row) in run.results.iter().enumerate() {
//!         println!("{:>3}. {} {:.3}", rank + 1, row.group_label, row.combined_score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `twostate-score` binary wraps the library with `score`, `batch` and
//! `config` subcommands; run `twostate-score --help` for details.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    clippy::cast_precision_loss,
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    // Variable names like `a`/`b` mirror the two reference states
    clippy::similar_names,
    clippy::many_single_char_names
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod scoring;
pub mod utils;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigPreset};
pub use config::{ConfigError, Validatable};
pub use error::{ErrorContext, RecordError, Result, TwoStateError};
pub use model::{
    DeclaredVersion, GroupId, GroupNameLookup, GroupResult, ModelProvenance, Pairing, RecordSet,
    ReferenceState, ScoreCell, ScoreRecord,
};
pub use reports::{ReportFormat, ReportGenerator};
pub use scoring::{
    run_batch, BatchRun, Mode, RankBy, Reconciliation, ReconciliationEngine, RescalePolicy,
    RunDiagnostics, RunInput,
};
