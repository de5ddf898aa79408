//! Score cell index.
//!
//! Records from both reference sets are bucketed per normalized group, then
//! each (declared version, reference state) partition is reduced to its best
//! score. A group present in only one set still gets all four cells; the
//! missing partitions are empty.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::RecordError;
use crate::model::{
    CellKey, CellQuad, DeclaredVersion, GroupId, ReferenceState, ScoreCell, ScoreRecord,
};

/// A record that was excluded before any reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRecord {
    pub reference: ReferenceState,
    pub error: RecordError,
}

/// Valid records of one group, split by reference state, with its cells.
#[derive(Debug, Clone)]
pub struct GroupRecords {
    pub group: GroupId,
    /// First label seen for this group
    pub label: String,
    ref_a: Vec<ScoreRecord>,
    ref_b: Vec<ScoreRecord>,
    cells: CellQuad,
}

impl GroupRecords {
    fn new(group: GroupId, label: &str) -> Self {
        Self {
            group,
            label: label.to_string(),
            ref_a: Vec::new(),
            ref_b: Vec::new(),
            cells: crate::model::empty_cells(),
        }
    }

    fn push(&mut self, reference: ReferenceState, record: ScoreRecord) {
        match reference {
            ReferenceState::A => self.ref_a.push(record),
            ReferenceState::B => self.ref_b.push(record),
        }
    }

    fn finalize(&mut self) {
        self.cells = CellKey::ALL.map(|key| self.reduce_excluding(key, None));
    }

    /// Valid records scored against `reference`, in input order.
    pub fn records(&self, reference: ReferenceState) -> &[ScoreRecord] {
        match reference {
            ReferenceState::A => &self.ref_a,
            ReferenceState::B => &self.ref_b,
        }
    }

    pub fn has_records(&self) -> bool {
        !self.ref_a.is_empty() || !self.ref_b.is_empty()
    }

    pub fn cells(&self) -> &CellQuad {
        &self.cells
    }

    pub fn cell(&self, key: CellKey) -> ScoreCell {
        self.cells[key.index()]
    }

    /// Recompute a cell, leaving out one model number.
    ///
    /// Produces a fresh cell; the stored cells are never modified.
    pub fn reduce_excluding(&self, key: CellKey, excluded_model: Option<u32>) -> ScoreCell {
        reduce_cell(
            key,
            self.records(key.reference)
                .iter()
                .filter(|r| excluded_model != Some(r.model_number)),
        )
    }

    /// Best record against `reference` regardless of declared version.
    ///
    /// Ties go to the lowest model number, then to v1.
    pub fn best_record(&self, reference: ReferenceState) -> Option<&ScoreRecord> {
        self.records(reference).iter().fold(None, |best, r| match best {
            Some(current) if !outranks(r, current) => Some(current),
            _ => Some(r),
        })
    }

    /// Record for `model_number` against `reference`.
    ///
    /// Prefers the same declared version; otherwise the first match in input
    /// order.
    pub fn find_model(
        &self,
        reference: ReferenceState,
        model_number: u32,
        version: DeclaredVersion,
    ) -> Option<&ScoreRecord> {
        let records = self.records(reference);
        records
            .iter()
            .find(|r| r.model_number == model_number && r.declared_version == version)
            .or_else(|| records.iter().find(|r| r.model_number == model_number))
    }
}

/// Whether `candidate` beats `current` as a cell maximum.
fn outranks(candidate: &ScoreRecord, current: &ScoreRecord) -> bool {
    if candidate.score != current.score {
        return candidate.score > current.score;
    }
    (candidate.model_number, candidate.declared_version)
        < (current.model_number, current.declared_version)
}

/// Reduce records to the best one within `key.version`.
///
/// Callers pass only finite scores. Equal maxima resolve to the lowest model
/// number.
pub fn reduce_cell<'a>(key: CellKey, records: impl IntoIterator<Item = &'a ScoreRecord>) -> ScoreCell {
    let best = records
        .into_iter()
        .filter(|r| r.declared_version == key.version)
        .fold(None::<&ScoreRecord>, |best, r| match best {
            Some(current) if !outranks(r, current) => Some(current),
            _ => Some(r),
        });

    match best {
        Some(r) => ScoreCell {
            key,
            best_score: r.score,
            best_model: Some(r.model_number),
        },
        None => ScoreCell::empty(key),
    }
}

/// Per-group cells for one run, in first-seen group order.
#[derive(Debug, Clone, Default)]
pub struct ScoreCellIndex {
    groups: IndexMap<GroupId, GroupRecords>,
    dropped: Vec<DroppedRecord>,
    without_valid_records: Vec<GroupRecords>,
}

impl ScoreCellIndex {
    /// Partition both record sets by group and reduce every cell.
    ///
    /// Groups come from the union of both sets. Records with a malformed
    /// group label or a non-finite score are dropped first; groups left with
    /// no valid record at all are set aside rather than indexed.
    pub fn build(records_a: &[ScoreRecord], records_b: &[ScoreRecord]) -> Self {
        let mut groups: IndexMap<GroupId, GroupRecords> = IndexMap::new();
        let mut dropped = Vec::new();

        let tagged = records_a
            .iter()
            .map(|r| (ReferenceState::A, r))
            .chain(records_b.iter().map(|r| (ReferenceState::B, r)));

        for (reference, record) in tagged {
            let id = match GroupId::normalize(&record.group) {
                Ok(id) => id,
                Err(error) => {
                    dropped.push(DroppedRecord { reference, error });
                    continue;
                }
            };
            let entry = groups
                .entry(id.clone())
                .or_insert_with(|| GroupRecords::new(id, &record.group));

            if record.has_valid_score() {
                entry.push(reference, record.clone());
            } else {
                dropped.push(DroppedRecord {
                    reference,
                    error: RecordError::invalid_score(
                        &record.group,
                        record.model_number,
                        format!("score is {}", record.score),
                    ),
                });
            }
        }

        let mut without_valid_records = Vec::new();
        let mut indexed = IndexMap::with_capacity(groups.len());
        for (id, mut group) in groups {
            if group.has_records() {
                group.finalize();
                indexed.insert(id, group);
            } else {
                without_valid_records.push(group);
            }
        }

        Self {
            groups: indexed,
            dropped,
            without_valid_records,
        }
    }

    pub fn get(&self, id: &GroupId) -> Option<&GroupRecords> {
        self.groups.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupRecords> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Records excluded before reduction.
    pub fn dropped(&self) -> &[DroppedRecord] {
        &self.dropped
    }

    /// Groups that appeared only with invalid records.
    pub fn groups_without_valid_records(&self) -> &[GroupRecords] {
        &self.without_valid_records
    }
}

/// Four cells for every group present in either record set.
pub fn build_cells(
    records_a: &[ScoreRecord],
    records_b: &[ScoreRecord],
) -> IndexMap<GroupId, CellQuad> {
    ScoreCellIndex::build(records_a, records_b)
        .iter()
        .map(|g| (g.group.clone(), *g.cells()))
        .collect()
}
