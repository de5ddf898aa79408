//! Batch pipeline tests over the fixture score tables.
//!
//! Fixtures live in `tests/fixtures/casp16` and follow the default
//! `{target}_{tag}_{score}_scores.csv` layout. T1228 only ships a `v2_1`
//! B table, so its runs resolve through the fallback tag.

use std::path::PathBuf;

use twostate_score::cli::{run_batch, run_score, BatchRequest, ScoreRequest};
use twostate_score::config::{load_config_file, AppConfig, TargetConfig};
use twostate_score::pipeline::{build_plan, execute_plan, exit_codes, load_lookup, output_batch};
use twostate_score::reports::ReportFormat;
use twostate_score::{Mode, RescalePolicy};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/casp16"))
}

fn fixture_config() -> AppConfig {
    AppConfig::builder()
        .data_dir(fixtures_dir())
        .lookup_file(Some(PathBuf::from("group_number_name_correspondance.csv")))
        .quiet(true)
        .target(
            "T1228",
            TargetConfig::with_scores(["GDT_TS"])
                .ref_b_tag("v1_1")
                .ref_b_fallback_tag("v2_1"),
        )
        .target(
            "R1203",
            TargetConfig::with_scores(["TMscore"]).mode(Mode::SingleGroup),
        )
        .build()
}

#[test]
fn test_plan_execute_and_write_per_run_files() {
    let out = tempfile::tempdir().unwrap();
    let mut config = fixture_config();
    config.output.dir = Some(out.path().to_path_buf());

    let plan = build_plan(&config, &[], &[]).unwrap();
    assert_eq!(plan.len(), 2);
    let lookup = load_lookup(&config, None).unwrap();
    let outcome = execute_plan(&config, plan, &lookup).unwrap();
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.completed[0].skipped_rows, 1);
    output_batch(&config, &outcome.completed).unwrap();

    let t1228 = std::fs::read_to_string(out.path().join("T1228_GDT_TS_two_state.csv")).unwrap();
    let lines: Vec<&str> = t1228.lines().collect();
    assert!(lines[0].starts_with("Group,Group_Name,Combined_Score"));
    assert_eq!(lines.len(), 4, "header plus three ranked groups");
    assert!(lines[1].starts_with("TS010,Alpha Lab,"));
    assert!(lines[1].ends_with(",0.82,0.79,TS010_v1_1,TS010_v2_2,canonical,0.82,v1_v1"));
    assert!(lines[2].starts_with("TS045,Gamma Dock,"));
    assert!(lines[2].contains(",swapped,"));

    let r1203 = std::fs::read_to_string(out.path().join("R1203_TMscore_two_state.csv")).unwrap();
    assert!(r1203.contains("TS003,Delta RNA,"));
    assert!(r1203.contains("TS003_v1_1,TS003_v2_2"));
}

#[test]
fn test_batch_json_document() {
    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("casp16.json");
    let mut config = fixture_config();
    config.output.format = ReportFormat::Json;
    config.output.file = Some(path.clone());
    config.engine.balance = true;

    let code = run_batch(&config, &BatchRequest::default()).unwrap();
    assert_eq!(code, exit_codes::SUCCESS);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    let runs = value["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["target"], "T1228");
    assert_eq!(runs[0]["summary"]["ranked"], 3);
    assert_eq!(runs[0]["summary"]["dropped_records"], 1);
    assert_eq!(runs[0]["summary"]["omitted_groups"], 1);
    assert_eq!(runs[1]["mode"], "single-group");
    assert_eq!(runs[1]["results"][0]["rank"], 1);
    assert!(runs[1]["results"][0]["tsbi_score"].is_number());
}

#[test]
fn test_batch_score_filter_and_missing_table() {
    let out = tempfile::tempdir().unwrap();
    let mut config = fixture_config();
    config.output.format = ReportFormat::Json;
    config.output.file = Some(out.path().join("out.json"));

    let request = BatchRequest {
        targets: vec!["T1228".to_string()],
        scores: vec!["GDT_TS".to_string(), "LDDT".to_string()],
        ..BatchRequest::default()
    };

    // Without continue-on-error the missing LDDT table aborts the batch.
    assert!(run_batch(&config, &request).is_err());

    config.behavior.continue_on_error = true;
    let code = run_batch(&config, &request).unwrap();
    assert_eq!(code, exit_codes::PARTIAL_FAILURE);
}

#[test]
fn test_score_command_with_percentage_rescale() {
    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("T1228.csv");
    let mut config = fixture_config();
    config.engine.rescale_by_score.insert("GDT_TS".to_string(), RescalePolicy::Percentage);
    config.output.format = ReportFormat::Csv;
    config.output.file = Some(path.clone());

    let request = ScoreRequest {
        target: Some("T1228".to_string()),
        score: "GDT_TS".to_string(),
        ..ScoreRequest::default()
    };
    assert_eq!(run_score(&config, &request).unwrap(), exit_codes::SUCCESS);

    let written = std::fs::read_to_string(path).unwrap();
    let first: Vec<&str> = written.lines().nth(1).unwrap().split(',').collect();
    assert_eq!(first[0], "TS010");
    let combined: f64 = first[2].parse().unwrap();
    assert!((combined - 161.0).abs() < 1e-6);
}

#[test]
fn test_missing_configured_lookup_is_an_error() {
    let mut config = fixture_config();
    config.data.lookup_file = Some(PathBuf::from("no_such_lookup.csv"));
    assert!(load_lookup(&config, None).is_err());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".twostate-score.yaml");
    let config = fixture_config();
    std::fs::write(&path, serde_yaml_ng::to_string(&config).unwrap()).unwrap();

    let loaded = load_config_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(
        loaded.targets.keys().collect::<Vec<_>>(),
        vec!["T1228", "R1203"]
    );
}
