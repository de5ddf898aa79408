//! Final ranking of group results.

use std::cmp::Ordering;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::GroupResult;

/// Sort key for the ranked table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum RankBy {
    /// Combined score across both reference states
    #[default]
    Combined,
    /// Balance-weighted score; rows without one sort as zero
    Tsbi,
}

impl RankBy {
    fn key(self, row: &GroupResult) -> f64 {
        match self {
            Self::Combined => row.combined_score,
            Self::Tsbi => row.tsbi_score.unwrap_or(0.0),
        }
    }
}

/// Whether a row may appear in the ranked table.
pub fn is_rankable(row: &GroupResult) -> bool {
    row.combined_score > 0.0
}

/// Drop non-positive rows and stable-sort the rest by combined score, descending.
pub fn rank(results: Vec<GroupResult>) -> Vec<GroupResult> {
    rank_by(results, RankBy::Combined)
}

/// Like [`rank`], sorting on `by` instead.
///
/// The positivity filter always applies to the combined score.
pub fn rank_by(results: Vec<GroupResult>, by: RankBy) -> Vec<GroupResult> {
    let mut ranked: Vec<GroupResult> = results.into_iter().filter(is_rankable).collect();
    ranked.sort_by(|a, b| {
        by.key(b)
            .partial_cmp(&by.key(a))
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{empty_cells, DeclaredVersion, GroupId, ModelProvenance};

    fn row(label: &str, combined: f64, tsbi: Option<f64>) -> GroupResult {
        GroupResult {
            group: GroupId::normalize(label).unwrap(),
            group_label: label.to_string(),
            group_name: "Unknown".to_string(),
            combined_score: combined,
            best_ref_a: combined,
            best_ref_b: Some(0.0),
            model_for_a: ModelProvenance::new(label, DeclaredVersion::V1, Some(1)),
            model_for_b: None,
            pairing: None,
            anchor: None,
            cells: empty_cells(),
            balance: None,
            tsbi_score: tsbi,
        }
    }

    fn labels(rows: &[GroupResult]) -> Vec<&str> {
        rows.iter().map(|r| r.group_label.as_str()).collect()
    }

    #[test]
    fn test_filters_and_sorts_descending() {
        let ranked = rank(vec![
            row("TS001", 0.5, None),
            row("TS002", 0.0, None),
            row("TS003", 1.2, None),
            row("TS004", -0.3, None),
        ]);
        assert_eq!(labels(&ranked), vec!["TS003", "TS001"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let ranked = rank(vec![
            row("TS009", 0.7, None),
            row("TS002", 0.7, None),
            row("TS005", 0.7, None),
        ]);
        assert_eq!(labels(&ranked), vec!["TS009", "TS002", "TS005"]);
    }

    #[test]
    fn test_rank_by_tsbi() {
        let ranked = rank_by(
            vec![
                row("TS001", 1.5, Some(0.2)),
                row("TS002", 1.0, Some(0.9)),
                row("TS003", 0.0, Some(5.0)),
                row("TS004", 0.4, None),
            ],
            RankBy::Tsbi,
        );
        assert_eq!(labels(&ranked), vec!["TS002", "TS001", "TS004"]);
    }
}
