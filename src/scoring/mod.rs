//! Dual-reference score reconciliation.
//!
//! Data flows one way:
//!
//! ```text
//! RecordSet (A) ─┐
//!                ├─> ScoreCellIndex ─> PairingSelector ─> CombinedScoreAssembler ─> rank
//! RecordSet (B) ─┘
//! ```
//!
//! [`ReconciliationEngine`] wires the stages together for one run. Each stage
//! is also usable on its own.

mod assembler;
mod balance;
mod cells;
mod engine;
mod pairing;
mod ranking;

pub use assembler::{CombinedScoreAssembler, RescalePolicy};
pub use balance::{calc_balance, BalanceScore, UNDEFINED_BALANCE};
pub use cells::{build_cells, reduce_cell, DroppedRecord, GroupRecords, ScoreCellIndex};
pub use engine::{
    run_batch, AmbiguousPairing, BatchRun, OmissionReason, OmittedGroup, Reconciliation,
    ReconciliationEngine, RunDiagnostics, RunInput,
};
pub use pairing::{Contribution, Mode, PairingSelector, Selection};
pub use ranking::{is_rankable, rank, rank_by, RankBy};
