//! Batch planning stage.
//!
//! Expands configured targets and their score types into independent runs.

use crate::config::AppConfig;
use crate::reports::ReportFormat;
use crate::scoring::{Mode, ReconciliationEngine};

use super::{PipelineError, RunPaths};

/// One planned (target, score type) run.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub target: String,
    pub score: String,
    pub engine: ReconciliationEngine,
    pub paths: RunPaths,
}

impl RunSpec {
    pub fn label(&self) -> String {
        format!("{}/{}", self.target, self.score)
    }

    /// `{target}_{score}_{suffix}.{ext}`
    pub fn output_file_name(&self, format: ReportFormat) -> String {
        format!(
            "{}_{}_{}.{}",
            self.target,
            self.score,
            output_suffix(&self.engine),
            format.extension()
        )
    }
}

/// File-name suffix describing how a run was scored.
pub fn output_suffix(engine: &ReconciliationEngine) -> String {
    let base = match engine.mode {
        Mode::MultiGroup | Mode::SingleGroup => "two_state",
        Mode::ModelLocked => "dual_state",
        Mode::SingleState => "single_state",
    };
    if engine.balance {
        format!("{base}_tsbi")
    } else {
        base.to_string()
    }
}

/// Plan runs for `targets` (all configured targets when empty).
///
/// A non-empty `scores` list replaces each target's configured score types.
pub fn build_plan(
    config: &AppConfig,
    targets: &[String],
    scores: &[String],
) -> Result<Vec<RunSpec>, PipelineError> {
    if let Some(unknown) = targets.iter().find(|t| !config.targets.contains_key(*t)) {
        return Err(PipelineError::EmptyPlan {
            reason: format!("target '{unknown}' is not configured"),
        });
    }

    let selected: Vec<&String> = if targets.is_empty() {
        config.targets.keys().collect()
    } else {
        targets.iter().collect()
    };

    let mut plan = Vec::new();
    for target in selected {
        let Some(target_cfg) = config.targets.get(target) else {
            continue;
        };
        let target_scores = if scores.is_empty() {
            target_cfg.scores.as_slice()
        } else {
            scores
        };
        for score in target_scores {
            let engine = config.engine_for(Some(target), score);
            plan.push(RunSpec {
                target: target.clone(),
                score: score.clone(),
                engine,
                paths: RunPaths::for_target(config, target, score, engine.mode),
            });
        }
    }

    if plan.is_empty() {
        return Err(PipelineError::EmptyPlan {
            reason: "no targets with score types are configured".to_string(),
        });
    }
    tracing::debug!(runs = plan.len(), "Planned batch");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;

    fn config() -> AppConfig {
        AppConfig::builder()
            .balance(true)
            .target("T1228", TargetConfig::with_scores(["GDT_TS", "TMscore"]))
            .target(
                "R1203",
                TargetConfig::with_scores(["GlobalLDDT"]).mode(Mode::SingleGroup),
            )
            .build()
    }

    #[test]
    fn test_plan_expands_all_targets_in_order() {
        let plan = build_plan(&config(), &[], &[]).unwrap();
        let labels: Vec<String> = plan.iter().map(RunSpec::label).collect();
        assert_eq!(labels, vec!["T1228/GDT_TS", "T1228/TMscore", "R1203/GlobalLDDT"]);
        assert_eq!(plan[2].engine.mode, Mode::SingleGroup);
    }

    #[test]
    fn test_plan_filters() {
        let plan = build_plan(&config(), &["R1203".to_string()], &["TMscore".to_string()]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].label(), "R1203/TMscore");

        let err = build_plan(&config(), &["T9999".to_string()], &[]).unwrap_err();
        assert!(err.to_string().contains("T9999"));

        assert!(build_plan(&AppConfig::default(), &[], &[]).is_err());
    }

    #[test]
    fn test_output_file_names() {
        let plan = build_plan(&config(), &[], &[]).unwrap();
        assert_eq!(
            plan[0].output_file_name(ReportFormat::Csv),
            "T1228_GDT_TS_two_state_tsbi.csv"
        );

        let engine = ReconciliationEngine::new(Mode::ModelLocked);
        assert_eq!(output_suffix(&engine), "dual_state");
        let engine = ReconciliationEngine::new(Mode::SingleState);
        assert_eq!(output_suffix(&engine), "single_state");
    }
}
