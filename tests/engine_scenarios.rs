//! End-to-end engine scenarios over small, hand-checked record sets.

use std::path::PathBuf;

use twostate_score::ingest::{load_group_names, load_record_set, ColumnMap};
use twostate_score::model::DeclaredVersion::{V1, V2};
use twostate_score::scoring::{calc_balance, OmissionReason, UNDEFINED_BALANCE};
use twostate_score::{
    DeclaredVersion, GroupNameLookup, GroupResult, Mode, Pairing, RankBy, RecordSet,
    ReconciliationEngine, ReferenceState, RescalePolicy, RunInput, ScoreRecord,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/casp16"))
}

fn set(reference: ReferenceState, rows: &[(&str, u32, DeclaredVersion, f64)]) -> RecordSet {
    RecordSet::with_records(
        reference,
        rows.iter()
            .map(|&(g, m, v, s)| ScoreRecord::new(g, m, v, s))
            .collect(),
    )
}

fn t1228_input() -> RunInput {
    let dir = fixtures_dir();
    let columns = ColumnMap::default();
    let a = load_record_set(
        &dir.join("T1228_v1_GDT_TS_scores.csv"),
        ReferenceState::A,
        "GDT_TS",
        &columns,
    )
    .unwrap();
    let b = load_record_set(
        &dir.join("T1228_v2_1_GDT_TS_scores.csv"),
        ReferenceState::B,
        "GDT_TS",
        &columns,
    )
    .unwrap();
    assert_eq!(a.skipped.len(), 1, "the N/A row is skipped at ingestion");
    RunInput::new(a.set, b.set)
}

fn lookup() -> GroupNameLookup {
    load_group_names(&fixtures_dir().join("group_number_name_correspondance.csv")).unwrap()
}

fn row<'a>(rows: &'a [GroupResult], label: &str) -> &'a GroupResult {
    rows.iter()
        .find(|r| r.group_label == label)
        .unwrap_or_else(|| panic!("no row for {label}"))
}

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Multi-group
// ============================================================================

#[test]
fn test_multi_group_fixture_ranking() {
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .reconcile(&t1228_input(), &lookup())
        .unwrap();

    let labels: Vec<&str> = run.results.iter().map(|r| r.group_label.as_str()).collect();
    assert_eq!(labels, vec!["TS010", "TS045", "TS020"]);

    let ts010 = row(&run.results, "TS010");
    approx(ts010.combined_score, 1.61);
    assert_eq!(ts010.pairing, Some(Pairing::Canonical));
    assert_eq!(ts010.group_name, "Alpha Lab");
    assert_eq!(ts010.model_for_a.to_string(), "TS010_v1_1");
    assert_eq!(ts010.model_for_b.as_ref().unwrap().to_string(), "TS010_v2_2");

    let ts045 = row(&run.results, "TS045");
    approx(ts045.combined_score, 1.35);
    assert_eq!(ts045.pairing, Some(Pairing::Swapped));
    approx(ts045.best_ref_a, 0.70);
    assert_eq!(ts045.model_for_a.to_string(), "TS045_v2_1");
    assert_eq!(ts045.model_for_b.as_ref().unwrap().to_string(), "TS045_v1_2");

    let ts020 = row(&run.results, "TS020");
    approx(ts020.combined_score, 0.61);
    assert_eq!(ts020.best_ref_b, Some(0.0));
    assert_eq!(ts020.model_for_a.to_string(), "TS020_v1_2");
    assert_eq!(ts020.model_for_b.as_ref().unwrap().to_string(), "TS020_v2_None");
    assert_eq!(ts020.group_name, "Beta Fold");
}

#[test]
fn test_multi_group_fixture_diagnostics() {
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .reconcile(&t1228_input(), &lookup())
        .unwrap();

    assert_eq!(run.diagnostics.dropped.len(), 1);
    assert_eq!(run.diagnostics.dropped[0].reference, ReferenceState::A);

    let omitted: Vec<(&str, OmissionReason)> = run
        .diagnostics
        .omitted
        .iter()
        .map(|o| (o.label.as_str(), o.reason))
        .collect();
    assert_eq!(omitted, vec![("TS030", OmissionReason::NoUsableData)]);
    assert!(run.diagnostics.ambiguous.is_empty());
}

#[test]
fn test_combined_equals_sum_of_contributions() {
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .reconcile(&t1228_input(), &GroupNameLookup::new())
        .unwrap();

    for result in &run.results {
        assert_eq!(result.combined_score, result.contributing_total());
        assert_eq!(result.group_name, "Unknown");
    }
}

#[test]
fn test_group_spellings_merge() {
    let a = set(
        ReferenceState::A,
        &[("TS007", 1, V1, 0.4), ("7", 2, V1, 0.6)],
    );
    let b = set(ReferenceState::B, &[("group 007", 1, V2, 0.5)]);
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .reconcile(&RunInput::new(a, b), &GroupNameLookup::new())
        .unwrap();

    assert_eq!(run.results.len(), 1);
    let only = &run.results[0];
    assert_eq!(only.group.as_str(), "007");
    assert_eq!(only.group_label, "TS007");
    approx(only.combined_score, 1.1);
}

#[test]
fn test_exact_tie_is_flagged_ambiguous() {
    let a = set(ReferenceState::A, &[("TS011", 1, V1, 0.5), ("TS011", 2, V2, 0.25)]);
    let b = set(ReferenceState::B, &[("TS011", 1, V1, 0.75), ("TS011", 2, V2, 0.5)]);
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .reconcile(&RunInput::new(a, b), &GroupNameLookup::new())
        .unwrap();

    assert_eq!(run.results[0].pairing, Some(Pairing::Canonical));
    assert_eq!(run.diagnostics.ambiguous.len(), 1);
    approx(run.diagnostics.ambiguous[0].total, 1.0);
}

// ============================================================================
// Single-group and model-locked
// ============================================================================

fn r1203_input() -> RunInput {
    let dir = fixtures_dir();
    let columns = ColumnMap::default();
    let a = load_record_set(
        &dir.join("R1203_v1_TMscore_scores.csv"),
        ReferenceState::A,
        "TMscore",
        &columns,
    )
    .unwrap();
    let b = load_record_set(
        &dir.join("R1203_v2_TMscore_scores.csv"),
        ReferenceState::B,
        "TMscore",
        &columns,
    )
    .unwrap();
    RunInput::new(a.set, b.set)
}

#[test]
fn test_single_group_never_reuses_a_model() {
    let run = ReconciliationEngine::new(Mode::SingleGroup)
        .reconcile(&r1203_input(), &lookup())
        .unwrap();

    let ts003 = row(&run.results, "TS003");
    assert_eq!(ts003.anchor, Some(ReferenceState::A));
    approx(ts003.combined_score, 1.43);
    assert_eq!(ts003.model_for_a.model_number, Some(1));
    assert_eq!(ts003.model_for_b.as_ref().unwrap().model_number, Some(2));
    assert_ne!(
        ts003.model_for_a.model_number,
        ts003.model_for_b.as_ref().unwrap().model_number
    );
    assert_eq!(ts003.group_name, "Delta RNA");
}

#[test]
fn test_multi_group_would_double_count_the_same_model() {
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .reconcile(&r1203_input(), &GroupNameLookup::new())
        .unwrap();
    approx(run.results[0].combined_score, 1.79);
}

#[test]
fn test_model_locked_scores_one_model_twice() {
    let run = ReconciliationEngine::new(Mode::ModelLocked)
        .reconcile(&r1203_input(), &GroupNameLookup::new())
        .unwrap();

    let ts003 = &run.results[0];
    assert_eq!(ts003.pairing, None);
    assert_eq!(ts003.model_for_a.model_number, Some(1));
    assert_eq!(ts003.model_for_b.as_ref().unwrap().model_number, Some(1));
    approx(ts003.combined_score, 0.91 + 0.88);
}

#[test]
fn test_model_locked_missing_partner_counts_a_only() {
    let a = set(ReferenceState::A, &[("TS004", 3, V1, 0.7)]);
    let b = set(ReferenceState::B, &[("TS004", 1, V2, 0.9)]);
    let run = ReconciliationEngine::new(Mode::ModelLocked)
        .reconcile(&RunInput::new(a, b), &GroupNameLookup::new())
        .unwrap();

    let ts004 = &run.results[0];
    assert_eq!(ts004.best_ref_b, None);
    assert!(ts004.model_for_b.is_none());
    approx(ts004.combined_score, 0.7);
}

#[test]
fn test_model_locked_b_only_group_is_omitted() {
    let a = set(ReferenceState::A, &[("TS004", 1, V1, 0.7)]);
    let b = set(ReferenceState::B, &[("TS009", 1, V2, 0.9)]);
    let run = ReconciliationEngine::new(Mode::ModelLocked)
        .reconcile(&RunInput::new(a, b), &GroupNameLookup::new())
        .unwrap();

    assert_eq!(run.results.len(), 1);
    assert_eq!(run.diagnostics.omitted[0].label, "TS009");
    assert_eq!(run.diagnostics.omitted[0].reason, OmissionReason::MissingAnchor);
}

// ============================================================================
// Single-state, rescale and balance
// ============================================================================

#[test]
fn test_single_state_ignores_swapped_models() {
    let a = set(
        ReferenceState::A,
        &[("TS010", 1, V1, 0.3), ("TS010", 2, V2, 0.9)],
    );
    let run = ReconciliationEngine::new(Mode::SingleState)
        .reconcile(&RunInput::single_state(a), &GroupNameLookup::new())
        .unwrap();

    let ts010 = &run.results[0];
    approx(ts010.combined_score, 0.3);
    assert_eq!(ts010.best_ref_b, None);
}

#[test]
fn test_percentage_rescale_scales_every_column() {
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .with_rescale(RescalePolicy::Percentage)
        .reconcile(&t1228_input(), &GroupNameLookup::new())
        .unwrap();

    let ts010 = row(&run.results, "TS010");
    assert!((ts010.combined_score - 161.0).abs() < 1e-6);
    assert!((ts010.best_ref_a - 82.0).abs() < 1e-6);
    assert!((ts010.best_ref_b.unwrap() - 79.0).abs() < 1e-6);
}

#[test]
fn test_detect_fraction_leaves_percent_columns_alone() {
    let a = set(ReferenceState::A, &[("TS001", 1, V1, 71.5)]);
    let b = set(ReferenceState::B, &[("TS001", 1, V2, 0.6)]);
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .with_rescale(RescalePolicy::DetectFraction)
        .reconcile(&RunInput::new(a, b), &GroupNameLookup::new())
        .unwrap();

    let ts001 = &run.results[0];
    approx(ts001.best_ref_a, 71.5);
    assert!((ts001.best_ref_b.unwrap() - 60.0).abs() < 1e-9);
}

#[test]
fn test_balance_columns_and_tsbi_ranking() {
    let a = set(
        ReferenceState::A,
        &[("TS001", 1, V1, 0.9), ("TS002", 1, V1, 0.5)],
    );
    let b = set(
        ReferenceState::B,
        &[("TS001", 1, V2, 0.1), ("TS002", 1, V2, 0.45)],
    );
    let input = RunInput::new(a, b);

    let by_combined = ReconciliationEngine::new(Mode::MultiGroup)
        .with_balance(true)
        .reconcile(&input, &GroupNameLookup::new())
        .unwrap();
    assert_eq!(by_combined.results[0].group_label, "TS001");

    let by_tsbi = ReconciliationEngine::new(Mode::MultiGroup)
        .with_balance(true)
        .with_rank_by(RankBy::Tsbi)
        .reconcile(&input, &GroupNameLookup::new())
        .unwrap();
    assert_eq!(by_tsbi.results[0].group_label, "TS002");

    let ts002 = row(&by_tsbi.results, "TS002");
    let expected = calc_balance(0.5, 0.45);
    assert_eq!(ts002.balance, Some(expected.balance));
    assert_eq!(ts002.tsbi_score, Some(expected.tsbi));
}

#[test]
fn test_balance_undefined_when_one_side_missing() {
    let run = ReconciliationEngine::new(Mode::MultiGroup)
        .with_balance(true)
        .reconcile(&t1228_input(), &GroupNameLookup::new())
        .unwrap();

    let ts020 = row(&run.results, "TS020");
    assert_eq!(ts020.balance, Some(UNDEFINED_BALANCE));
    assert_eq!(ts020.tsbi_score, Some(0.0));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_reruns_are_identical() {
    let engine = ReconciliationEngine::new(Mode::MultiGroup).with_balance(true);
    let input = t1228_input();
    let names = lookup();

    let first = engine.reconcile(&input, &names).unwrap();
    let second = engine.reconcile(&input, &names).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn test_fingerprint_tracks_results() {
    let input = t1228_input();
    let plain = ReconciliationEngine::new(Mode::MultiGroup)
        .reconcile(&input, &GroupNameLookup::new())
        .unwrap();
    let scaled = ReconciliationEngine::new(Mode::MultiGroup)
        .with_rescale(RescalePolicy::Percentage)
        .reconcile(&input, &GroupNameLookup::new())
        .unwrap();

    assert_ne!(plain.fingerprint(), scaled.fingerprint());
}

#[test]
fn test_batch_matches_individual_runs() {
    use twostate_score::{run_batch, BatchRun};

    let runs = vec![
        BatchRun {
            label: "T1228/GDT_TS".to_string(),
            engine: ReconciliationEngine::new(Mode::MultiGroup),
            input: t1228_input(),
        },
        BatchRun {
            label: "R1203/TMscore".to_string(),
            engine: ReconciliationEngine::new(Mode::SingleGroup),
            input: r1203_input(),
        },
    ];
    let names = lookup();
    let batch = run_batch(&runs, &names);

    assert_eq!(batch.len(), 2);
    for (run, result) in runs.iter().zip(batch) {
        let expected = run.engine.reconcile(&run.input, &names).unwrap();
        assert_eq!(result.unwrap(), expected);
    }
}
