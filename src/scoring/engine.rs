//! Reconciliation engine.
//!
//! One engine value describes a policy (mode, rescale, balance, ranking key).
//! [`ReconciliationEngine::reconcile`] runs it over the two record sets of a
//! single (target, score type) pair. Runs share nothing, so
//! [`run_batch`] fans many of them out over rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::assembler::{CombinedScoreAssembler, RescalePolicy};
use super::cells::{DroppedRecord, ScoreCellIndex};
use super::pairing::{Mode, PairingSelector};
use super::ranking::{is_rankable, rank_by, RankBy};
use crate::error::{ReconcileErrorKind, Result, TwoStateError};
use crate::model::{GroupId, GroupNameLookup, GroupResult, RecordSet, ReferenceState, ScoreRecord};
use crate::utils::content_hash;

/// The two record sets feeding one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInput {
    pub ref_a: Option<RecordSet>,
    pub ref_b: Option<RecordSet>,
}

impl RunInput {
    pub fn new(ref_a: RecordSet, ref_b: RecordSet) -> Self {
        Self {
            ref_a: Some(ref_a),
            ref_b: Some(ref_b),
        }
    }

    /// Input with reference state A only.
    pub fn single_state(ref_a: RecordSet) -> Self {
        Self {
            ref_a: Some(ref_a),
            ref_b: None,
        }
    }

    fn set(&self, reference: ReferenceState) -> Option<&RecordSet> {
        match reference {
            ReferenceState::A => self.ref_a.as_ref(),
            ReferenceState::B => self.ref_b.as_ref(),
        }
    }
}

/// Why a group produced no ranked row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OmissionReason {
    /// Every record for the group was dropped
    NoValidRecords,
    /// No positive contribution from either reference state
    NoUsableData,
    /// Model-locked mode found no reference-A record to anchor on
    MissingAnchor,
}

impl std::fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoValidRecords => write!(f, "no valid records"),
            Self::NoUsableData => write!(f, "no usable data"),
            Self::MissingAnchor => write!(f, "no reference-A model to anchor on"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmittedGroup {
    pub group: GroupId,
    pub label: String,
    pub reason: OmissionReason,
}

/// Canonical and swapped pairings tied; canonical was kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousPairing {
    pub group: GroupId,
    pub label: String,
    pub total: f64,
}

/// Non-fatal findings collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunDiagnostics {
    pub dropped: Vec<DroppedRecord>,
    pub omitted: Vec<OmittedGroup>,
    pub ambiguous: Vec<AmbiguousPairing>,
}

impl RunDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty() && self.omitted.is_empty() && self.ambiguous.is_empty()
    }
}

/// Ranked output of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub mode: Mode,
    pub results: Vec<GroupResult>,
    pub diagnostics: RunDiagnostics,
}

impl Reconciliation {
    /// Stable hash of the ranked rows; equal across idempotent reruns.
    pub fn fingerprint(&self) -> u64 {
        serde_json::to_vec(&self.results)
            .map(|bytes| content_hash(&bytes))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Parameterized reconciliation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationEngine {
    pub mode: Mode,
    pub rescale: RescalePolicy,
    pub balance: bool,
    pub rank_by: RankBy,
}

impl ReconciliationEngine {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rescale(mut self, rescale: RescalePolicy) -> Self {
        self.rescale = rescale;
        self
    }

    #[must_use]
    pub fn with_balance(mut self, enabled: bool) -> Self {
        self.balance = enabled;
        self
    }

    #[must_use]
    pub fn with_rank_by(mut self, rank_by: RankBy) -> Self {
        self.rank_by = rank_by;
        self
    }

    /// Reconcile one (target, score type) run.
    ///
    /// Fails only on structural problems: a record set the mode needs is
    /// missing, or a set is labelled with the wrong reference state. Bad
    /// records and unrankable groups end up in the diagnostics.
    pub fn reconcile(&self, input: &RunInput, lookup: &GroupNameLookup) -> Result<Reconciliation> {
        let records_a = self.records_for(input, ReferenceState::A)?;
        let records_b = if self.mode.is_two_state() {
            self.records_for(input, ReferenceState::B)?
        } else {
            &[][..]
        };

        let index = ScoreCellIndex::build(records_a, records_b);
        let mut diagnostics = RunDiagnostics {
            dropped: index.dropped().to_vec(),
            ..RunDiagnostics::default()
        };
        for dropped in &diagnostics.dropped {
            tracing::warn!(reference = %dropped.reference, "dropped record: {}", dropped.error);
        }
        for group in index.groups_without_valid_records() {
            diagnostics.omitted.push(OmittedGroup {
                group: group.group.clone(),
                label: group.label.clone(),
                reason: OmissionReason::NoValidRecords,
            });
        }

        let selector = PairingSelector::new(self.mode);
        let assembler = CombinedScoreAssembler::new(lookup)
            .with_rescale(self.rescale)
            .with_balance(self.balance);

        let mut rows = Vec::with_capacity(index.len());
        for group in index.iter() {
            let Some(selection) = selector.select(group) else {
                diagnostics.omitted.push(OmittedGroup {
                    group: group.group.clone(),
                    label: group.label.clone(),
                    reason: OmissionReason::MissingAnchor,
                });
                continue;
            };
            if selection.ambiguous {
                tracing::debug!(
                    group = %group.group,
                    total = selection.combined(),
                    "canonical and swapped pairings tie; keeping canonical"
                );
                diagnostics.ambiguous.push(AmbiguousPairing {
                    group: group.group.clone(),
                    label: group.label.clone(),
                    total: selection.combined(),
                });
            }
            rows.push(assembler.assemble(group, &selection));
        }

        let rows = assembler.finish(rows);
        for row in rows.iter().filter(|r| !is_rankable(r)) {
            diagnostics.omitted.push(OmittedGroup {
                group: row.group.clone(),
                label: row.group_label.clone(),
                reason: OmissionReason::NoUsableData,
            });
        }
        for omitted in &diagnostics.omitted {
            tracing::debug!(group = %omitted.label, "omitting group: {}", omitted.reason);
        }

        let results = rank_by(rows, self.rank_by);
        tracing::info!(
            mode = %self.mode,
            groups = index.len(),
            ranked = results.len(),
            dropped = diagnostics.dropped.len(),
            "reconciliation complete"
        );

        Ok(Reconciliation {
            mode: self.mode,
            results,
            diagnostics,
        })
    }

    fn records_for<'i>(&self, input: &'i RunInput, reference: ReferenceState) -> Result<&'i [ScoreRecord]> {
        match input.set(reference) {
            Some(set) if set.reference != reference => Err(TwoStateError::reconcile(
                "checking run inputs",
                ReconcileErrorKind::MislabelledReferenceSet {
                    expected: reference,
                    found: set.reference,
                },
            )),
            Some(set) => Ok(&set.records),
            None if self.mode.requires(reference) => {
                Err(TwoStateError::missing_reference_set(reference, self.mode.as_str()))
            }
            None => Ok(&[][..]),
        }
    }
}

/// One entry of a batch: a labelled engine and its input.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub label: String,
    pub engine: ReconciliationEngine,
    pub input: RunInput,
}

/// Reconcile independent runs in parallel; results keep input order.
pub fn run_batch(runs: &[BatchRun], lookup: &GroupNameLookup) -> Vec<Result<Reconciliation>> {
    runs.par_iter()
        .map(|run| {
            let _span = tracing::debug_span!("run", label = %run.label).entered();
            run.engine.reconcile(&run.input, lookup)
        })
        .collect()
}
