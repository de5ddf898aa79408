//! Score command handler.
//!
//! Implements the `score` subcommand: one (target, score type) run.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::config::AppConfig;
use crate::pipeline::{
    exit_codes, load_lookup, load_run_input, output_single, CompletedRun, RunPaths, RunSpec,
};

use super::ensure_valid;

/// What to score.
///
/// Either `ref_a` (and `ref_b` for two-state modes) names the tables
/// directly, or `target` locates them through the configured data layout.
#[derive(Debug, Clone, Default)]
pub struct ScoreRequest {
    pub target: Option<String>,
    pub score: String,
    pub ref_a: Option<PathBuf>,
    pub ref_b: Option<PathBuf>,
    pub lookup: Option<PathBuf>,
}

impl ScoreRequest {
    fn spec(&self, config: &AppConfig) -> Result<RunSpec> {
        let engine = config.engine_for(self.target.as_deref(), &self.score);
        let (target, paths) = match (&self.ref_a, &self.target) {
            (Some(ref_a), target) => {
                let name = target.clone().unwrap_or_else(|| {
                    ref_a
                        .file_stem()
                        .map_or_else(|| "run".to_string(), |s| s.to_string_lossy().into_owned())
                });
                (name, RunPaths::new(ref_a, self.ref_b.clone()))
            }
            (None, Some(target)) => (
                target.clone(),
                RunPaths::for_target(config, target, &self.score, engine.mode),
            ),
            (None, None) => bail!("either --target or --ref-a is required"),
        };
        Ok(RunSpec {
            target,
            score: self.score.clone(),
            engine,
            paths,
        })
    }
}

/// Run the score command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_score(config: &AppConfig, request: &ScoreRequest) -> Result<i32> {
    ensure_valid(config)?;
    let quiet = config.behavior.quiet;
    let spec = request.spec(config)?;

    if !quiet {
        tracing::info!(
            run = %spec.label(),
            mode = %spec.engine.mode,
            rescale = ?spec.engine.rescale,
            "Scoring"
        );
    }

    let lookup = load_lookup(config, request.lookup.as_deref())
        .context("Failed to load group-name lookup")?;
    let loaded = load_run_input(&spec.paths, &spec.score, &config.data.columns, quiet)
        .with_context(|| format!("Failed to load score tables for {}", spec.label()))?;
    let reconciliation = spec
        .engine
        .reconcile(&loaded.input, &lookup)
        .with_context(|| format!("Failed to reconcile {}", spec.label()))?;

    let empty = reconciliation.is_empty();
    let run = CompletedRun {
        spec,
        reconciliation,
        skipped_rows: loaded.skipped_rows,
    };
    output_single(config, &run)?;

    if empty {
        tracing::warn!(run = %run.spec.label(), "No group has a positive combined score");
        if config.behavior.fail_on_empty {
            return Ok(exit_codes::EMPTY_RANKING);
        }
    }
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportFormat;

    fn write(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_run_score_with_explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "Group,Model Number,GDT_TS\nTS010,1,0.8\n");
        let b = write(dir.path(), "b.csv", "Group,Model Number,GDT_TS\nTS010,2,0.7\n");
        let out = dir.path().join("ranking.csv");

        let config = AppConfig::builder()
            .quiet(true)
            .output_format(ReportFormat::Csv)
            .output_file(Some(out.clone()))
            .build();
        let request = ScoreRequest {
            score: "GDT_TS".to_string(),
            ref_a: Some(a),
            ref_b: Some(b),
            ..ScoreRequest::default()
        };

        assert_eq!(run_score(&config, &request).unwrap(), exit_codes::SUCCESS);
        let written = std::fs::read_to_string(out).unwrap();
        assert!(written.contains("TS010,Unknown,1.5,0.8,0.7"));
    }

    #[test]
    fn test_run_score_empty_ranking_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "Group,Model Number,GDT_TS\nTS010,1,0\n");
        let b = write(dir.path(), "b.csv", "Group,Model Number,GDT_TS\nTS010,1,0\n");

        let mut config = AppConfig::builder()
            .quiet(true)
            .output_format(ReportFormat::Json)
            .output_file(Some(dir.path().join("out.json")))
            .build();
        config.behavior.fail_on_empty = true;
        let request = ScoreRequest {
            score: "GDT_TS".to_string(),
            ref_a: Some(a),
            ref_b: Some(b),
            ..ScoreRequest::default()
        };

        assert_eq!(run_score(&config, &request).unwrap(), exit_codes::EMPTY_RANKING);
    }

    #[test]
    fn test_run_score_needs_inputs() {
        let request = ScoreRequest {
            score: "GDT_TS".to_string(),
            ..ScoreRequest::default()
        };
        assert!(run_score(&AppConfig::default(), &request).is_err());
    }
}
