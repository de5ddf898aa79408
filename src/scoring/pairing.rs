//! Pairing selection.
//!
//! Chooses, per group, which cells contribute to the combined score. Four
//! policies exist:
//!
//! - **Multi-group**: pick the better of canonical (v1→A + v2→B) and swapped
//!   (v2→A + v1→B). Exact ties keep canonical.
//! - **Single-group**: anchor on the higher of v1→A and v2→B, then re-reduce
//!   the other side without the anchor's model number.
//! - **Model-locked**: anchor on the best reference-A model of any version
//!   and score that same model against B, if it was assessed there.
//! - **Single-state**: only v1→A counts.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::cells::GroupRecords;
use crate::model::{CellKey, DeclaredVersion, Pairing, ReferenceState, ScoreCell};

/// Reconciliation policy for a run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Best of canonical and swapped pairings
    #[default]
    MultiGroup,
    /// Anchor side plus a model-disjoint complement
    SingleGroup,
    /// One model evaluated against both states
    ModelLocked,
    /// Reference state A only
    SingleState,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiGroup => "multi-group",
            Self::SingleGroup => "single-group",
            Self::ModelLocked => "model-locked",
            Self::SingleState => "single-state",
        }
    }

    /// Whether a run in this mode cannot proceed without `reference`.
    pub fn requires(self, reference: ReferenceState) -> bool {
        match reference {
            ReferenceState::A => true,
            ReferenceState::B => self != Self::SingleState,
        }
    }

    /// Whether the combined score is the sum of two sides.
    pub fn is_two_state(self) -> bool {
        self != Self::SingleState
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a selection: the score credited against a reference state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub reference: ReferenceState,
    pub version: DeclaredVersion,
    pub score: f64,
    pub model_number: Option<u32>,
}

impl Contribution {
    fn from_cell(cell: ScoreCell) -> Self {
        Self {
            reference: cell.key.reference,
            version: cell.key.version,
            score: cell.best_score,
            model_number: cell.best_model,
        }
    }
}

/// Outcome of pairing selection for one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub ref_a: Contribution,
    /// `None` when B is not part of the mode or the locked model is missing there
    pub ref_b: Option<Contribution>,
    pub pairing: Option<Pairing>,
    pub anchor: Option<ReferenceState>,
    /// Canonical and swapped totals tied on a non-zero score
    pub ambiguous: bool,
}

impl Selection {
    pub fn combined(&self) -> f64 {
        self.ref_a.score + self.ref_b.map_or(0.0, |b| b.score)
    }
}

/// Applies a [`Mode`] to a group's cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairingSelector {
    mode: Mode,
}

impl PairingSelector {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Select contributing scores for `group`.
    ///
    /// Returns `None` only in model-locked mode when the group has no
    /// reference-A record to anchor on.
    pub fn select(&self, group: &GroupRecords) -> Option<Selection> {
        match self.mode {
            Mode::MultiGroup => Some(select_multi_group(group)),
            Mode::SingleGroup => Some(select_single_group(group)),
            Mode::ModelLocked => select_model_locked(group),
            Mode::SingleState => Some(select_single_state(group)),
        }
    }
}

fn select_multi_group(group: &GroupRecords) -> Selection {
    let canonical = group.cell(CellKey::V1_A).best_score + group.cell(CellKey::V2_B).best_score;
    let swapped = group.cell(CellKey::V2_A).best_score + group.cell(CellKey::V1_B).best_score;

    let (pairing, a_key, b_key) = if swapped > canonical {
        (Pairing::Swapped, CellKey::V2_A, CellKey::V1_B)
    } else {
        (Pairing::Canonical, CellKey::V1_A, CellKey::V2_B)
    };

    Selection {
        ref_a: Contribution::from_cell(group.cell(a_key)),
        ref_b: Some(Contribution::from_cell(group.cell(b_key))),
        pairing: Some(pairing),
        anchor: None,
        ambiguous: canonical == swapped && canonical > 0.0,
    }
}

fn select_single_group(group: &GroupRecords) -> Selection {
    let v1_a = group.cell(CellKey::V1_A);
    let v2_b = group.cell(CellKey::V2_B);

    // Strict comparison: an exact tie anchors on B.
    let (ref_a, ref_b, anchor) = if v1_a.best_score > v2_b.best_score {
        let complement = group.reduce_excluding(CellKey::V2_B, v1_a.best_model);
        (v1_a, complement, ReferenceState::A)
    } else {
        let complement = group.reduce_excluding(CellKey::V1_A, v2_b.best_model);
        (complement, v2_b, ReferenceState::B)
    };

    let complement = if anchor == ReferenceState::A { ref_b } else { ref_a };
    if complement.is_empty() {
        tracing::debug!(
            group = %group.group,
            anchor = %anchor,
            "no model left for the complementary side after exclusion; crediting 0.0"
        );
    }

    Selection {
        ref_a: Contribution::from_cell(ref_a),
        ref_b: Some(Contribution::from_cell(ref_b)),
        pairing: Some(Pairing::Canonical),
        anchor: Some(anchor),
        ambiguous: false,
    }
}

fn select_model_locked(group: &GroupRecords) -> Option<Selection> {
    let anchor = group.best_record(ReferenceState::A)?;
    let partner = group.find_model(ReferenceState::B, anchor.model_number, anchor.declared_version);

    Some(Selection {
        ref_a: Contribution {
            reference: ReferenceState::A,
            version: anchor.declared_version,
            score: anchor.score,
            model_number: Some(anchor.model_number),
        },
        ref_b: partner.map(|r| Contribution {
            reference: ReferenceState::B,
            version: r.declared_version,
            score: r.score,
            model_number: Some(r.model_number),
        }),
        pairing: None,
        anchor: Some(ReferenceState::A),
        ambiguous: false,
    })
}

fn select_single_state(group: &GroupRecords) -> Selection {
    Selection {
        ref_a: Contribution::from_cell(group.cell(CellKey::V1_A)),
        ref_b: None,
        pairing: None,
        anchor: None,
        ambiguous: false,
    }
}
