//! Score cells: the best score per (declared version, reference state).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DeclaredVersion, ReferenceState};

/// Address of one of the four cells kept per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub version: DeclaredVersion,
    pub reference: ReferenceState,
}

impl CellKey {
    pub const V1_A: Self = Self::new(DeclaredVersion::V1, ReferenceState::A);
    pub const V2_A: Self = Self::new(DeclaredVersion::V2, ReferenceState::A);
    pub const V1_B: Self = Self::new(DeclaredVersion::V1, ReferenceState::B);
    pub const V2_B: Self = Self::new(DeclaredVersion::V2, ReferenceState::B);

    /// Cells in storage order.
    pub const ALL: [Self; 4] = [Self::V1_A, Self::V2_A, Self::V1_B, Self::V2_B];

    pub const fn new(version: DeclaredVersion, reference: ReferenceState) -> Self {
        Self { version, reference }
    }

    /// Order in which cells win a tie for the best single score.
    pub const BEST_PRIORITY: [Self; 4] = [Self::V1_A, Self::V2_B, Self::V2_A, Self::V1_B];

    /// Position of this key inside a `[ScoreCell; 4]`.
    pub const fn index(self) -> usize {
        let version = match self.version {
            DeclaredVersion::V1 => 0,
            DeclaredVersion::V2 => 1,
        };
        let reference = match self.reference {
            ReferenceState::A => 0,
            ReferenceState::B => 2,
        };
        version + reference
    }
}

impl CellKey {
    /// `"{reference version}_{model version}"`, e.g. `v1_v2` for a v2 model
    /// scored against reference A.
    pub fn source_label(self) -> String {
        format!("{}_{}", self.reference.native_version(), self.version)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.version, self.reference.ref_label())
    }
}

/// Best score found in one partition, with the model that produced it.
///
/// An empty partition is `best_score == 0.0` and `best_model == None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCell {
    pub key: CellKey,
    pub best_score: f64,
    pub best_model: Option<u32>,
}

impl ScoreCell {
    pub fn empty(key: CellKey) -> Self {
        Self {
            key,
            best_score: 0.0,
            best_model: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.best_model.is_none()
    }
}

/// The four cells of one group in [`CellKey::ALL`] order.
pub type CellQuad = [ScoreCell; 4];

/// Four empty cells.
pub fn empty_cells() -> CellQuad {
    CellKey::ALL.map(ScoreCell::empty)
}
