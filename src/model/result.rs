//! Output rows of a reconciliation run.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{CellKey, CellQuad, DeclaredVersion, GroupId, ReferenceState, ScoreCell};

/// Which two cells contribute to the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    /// v1 model against A, v2 model against B
    Canonical,
    /// v2 model against A, v1 model against B
    Swapped,
}

impl Pairing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Swapped => "swapped",
        }
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the model behind one contributing score.
///
/// Renders as `"{group}_{version}_{model}"`, with `None` in place of the
/// model number when no model contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProvenance {
    pub group: String,
    pub version: DeclaredVersion,
    pub model_number: Option<u32>,
}

impl ModelProvenance {
    pub fn new(group: impl Into<String>, version: DeclaredVersion, model_number: Option<u32>) -> Self {
        Self {
            group: group.into(),
            version,
            model_number,
        }
    }
}

impl fmt::Display for ModelProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.model_number {
            Some(n) => write!(f, "{}_{}_{}", self.group, self.version, n),
            None => write!(f, "{}_{}_None", self.group, self.version),
        }
    }
}

/// Reconciled score for one group in one (target, score type) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    pub group: GroupId,
    /// Label as it first appeared in the input
    pub group_label: String,
    pub group_name: String,
    pub combined_score: f64,
    pub best_ref_a: f64,
    /// `None` when reference B was not consulted or had no matching model
    pub best_ref_b: Option<f64>,
    pub model_for_a: ModelProvenance,
    pub model_for_b: Option<ModelProvenance>,
    pub pairing: Option<Pairing>,
    /// Side whose score fixed the pairing, when one did
    pub anchor: Option<ReferenceState>,
    pub cells: CellQuad,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsbi_score: Option<f64>,
}

impl GroupResult {
    /// Sum of the contributing sides; `None` on B counts as nothing.
    pub fn contributing_total(&self) -> f64 {
        self.best_ref_a + self.best_ref_b.unwrap_or(0.0)
    }

    /// Highest non-zero cell regardless of pairing.
    ///
    /// Ties follow [`CellKey::BEST_PRIORITY`]. `None` when every cell is zero.
    pub fn best_cell(&self) -> Option<&ScoreCell> {
        let mut best: Option<&ScoreCell> = None;
        for key in CellKey::BEST_PRIORITY {
            let cell = &self.cells[key.index()];
            if cell.best_score == 0.0 {
                continue;
            }
            if best.map_or(true, |b| cell.best_score > b.best_score) {
                best = Some(cell);
            }
        }
        best
    }
}
