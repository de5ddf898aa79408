//! Raw score records and the record sets they arrive in.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Model version a group declared when submitting a prediction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredVersion {
    V1,
    V2,
}

impl DeclaredVersion {
    /// Both versions, v1 first.
    pub const ALL: [Self; 2] = [Self::V1, Self::V2];

    /// Short label used in provenance strings and file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    /// Reference state this version is intended to model.
    pub fn native_reference(self) -> ReferenceState {
        match self {
            Self::V1 => ReferenceState::A,
            Self::V2 => ReferenceState::B,
        }
    }
}

impl fmt::Display for DeclaredVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeclaredVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            other => Err(format!("unrecognised model version '{other}'")),
        }
    }
}

/// One of the two ground-truth structures a model is scored against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum ReferenceState {
    A,
    B,
}

impl ReferenceState {
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// Declared version whose models target this state.
    pub fn native_version(self) -> DeclaredVersion {
        match self {
            Self::A => DeclaredVersion::V1,
            Self::B => DeclaredVersion::V2,
        }
    }

    /// Column label used in reports (`v1_ref` / `v2_ref`).
    pub fn ref_label(self) -> &'static str {
        match self {
            Self::A => "v1_ref",
            Self::B => "v2_ref",
        }
    }
}

impl fmt::Display for ReferenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// One submitted model evaluated against one reference state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Group label as submitted, e.g. `"TS314"`
    pub group: String,
    pub model_number: u32,
    pub declared_version: DeclaredVersion,
    pub score: f64,
}

impl ScoreRecord {
    pub fn new(
        group: impl Into<String>,
        model_number: u32,
        declared_version: DeclaredVersion,
        score: f64,
    ) -> Self {
        Self {
            group: group.into(),
            model_number,
            declared_version,
            score,
        }
    }

    /// NaN and infinite scores never take part in a reduction.
    pub fn has_valid_score(&self) -> bool {
        self.score.is_finite()
    }
}

/// All records for one (target, reference state) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    pub reference: ReferenceState,
    pub records: Vec<ScoreRecord>,
}

impl RecordSet {
    pub fn new(reference: ReferenceState) -> Self {
        Self {
            reference,
            records: Vec::new(),
        }
    }

    pub fn with_records(reference: ReferenceState, records: Vec<ScoreRecord>) -> Self {
        Self { reference, records }
    }

    pub fn push(&mut self, record: ScoreRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreRecord> {
        self.records.iter()
    }
}
