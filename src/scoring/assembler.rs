//! Folds pairing selections into result rows.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::balance::calc_balance;
use super::cells::GroupRecords;
use super::pairing::Selection;
use crate::model::{GroupNameLookup, GroupResult, ModelProvenance, ReferenceState};

/// Unit handling for a score type.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum RescalePolicy {
    /// Scores are already in the reporting unit
    #[default]
    Keep,
    /// Scores are fractions; multiply every column by 100
    Percentage,
    /// Multiply a reference column by 100 when its maximum over the run is at most 1.0
    DetectFraction,
}

const PERCENT: f64 = 100.0;

impl RescalePolicy {
    /// Factors for the A and B columns of a full run.
    fn factors(self, rows: &[GroupResult]) -> (f64, f64) {
        match self {
            Self::Keep => (1.0, 1.0),
            Self::Percentage => (PERCENT, PERCENT),
            Self::DetectFraction => {
                let max_a = rows.iter().map(|r| r.best_ref_a).fold(f64::NEG_INFINITY, f64::max);
                let max_b = rows
                    .iter()
                    .filter_map(|r| r.best_ref_b)
                    .fold(f64::NEG_INFINITY, f64::max);
                let factor = |max: f64| if max <= 1.0 { PERCENT } else { 1.0 };
                (factor(max_a), factor(max_b))
            }
        }
    }
}

/// Builds [`GroupResult`] rows and applies run-wide post-processing.
#[derive(Debug, Clone, Copy)]
pub struct CombinedScoreAssembler<'a> {
    lookup: &'a GroupNameLookup,
    rescale: RescalePolicy,
    balance: bool,
}

impl<'a> CombinedScoreAssembler<'a> {
    pub fn new(lookup: &'a GroupNameLookup) -> Self {
        Self {
            lookup,
            rescale: RescalePolicy::default(),
            balance: false,
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

    /// One row for `group` from its selection, in input units.
    pub fn assemble(&self, group: &GroupRecords, selection: &Selection) -> GroupResult {
        let a = selection.ref_a;
        GroupResult {
            group: group.group.clone(),
            group_label: group.label.clone(),
            group_name: self.lookup.resolve_name(&group.group),
            combined_score: selection.combined(),
            best_ref_a: a.score,
            best_ref_b: selection.ref_b.map(|b| b.score),
            model_for_a: ModelProvenance::new(&group.label, a.version, a.model_number),
            model_for_b: selection
                .ref_b
                .map(|b| ModelProvenance::new(&group.label, b.version, b.model_number)),
            pairing: selection.pairing,
            anchor: selection.anchor,
            cells: *group.cells(),
            balance: None,
            tsbi_score: None,
        }
    }

    /// Apply the rescale policy across all rows, then balance if enabled.
    ///
    /// Rescaling is a column decision over the whole run, so this must see
    /// every row at once. Combined scores are recomputed afterwards.
    pub fn finish(&self, rows: Vec<GroupResult>) -> Vec<GroupResult> {
        let (factor_a, factor_b) = self.rescale.factors(&rows);
        if factor_a != 1.0 || factor_b != 1.0 {
            tracing::debug!(factor_a, factor_b, "rescaling score columns");
        }

        rows.into_iter()
            .map(|mut row| {
                row.best_ref_a *= factor_a;
                row.best_ref_b = row.best_ref_b.map(|b| b * factor_b);
                for cell in &mut row.cells {
                    cell.best_score *= match cell.key.reference {
                        ReferenceState::A => factor_a,
                        ReferenceState::B => factor_b,
                    };
                }
                row.combined_score = row.contributing_total();

                if self.balance {
                    let score = calc_balance(row.best_ref_a, row.best_ref_b.unwrap_or(0.0));
                    row.balance = Some(score.balance);
                    row.tsbi_score = Some(score.tsbi);
                }
                row
            })
            .collect()
    }
}
