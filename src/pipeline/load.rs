//! Input loading stage.
//!
//! Turns configured paths into record sets and a group-name lookup.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::{ErrorContext, Result};
use crate::ingest::{load_group_names, load_record_set, ColumnMap};
use crate::model::{GroupNameLookup, ReferenceState};
use crate::scoring::{Mode, RunInput};

/// Score tables for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub ref_a: PathBuf,
    /// Absent for single-state runs
    pub ref_b: Option<PathBuf>,
}

impl RunPaths {
    pub fn new(ref_a: impl Into<PathBuf>, ref_b: Option<PathBuf>) -> Self {
        Self {
            ref_a: ref_a.into(),
            ref_b,
        }
    }

    /// Paths under the configured data layout.
    pub fn for_target(config: &AppConfig, target: &str, score: &str, mode: Mode) -> Self {
        Self {
            ref_a: config.score_path(target, ReferenceState::A, score),
            ref_b: mode
                .is_two_state()
                .then(|| config.score_path(target, ReferenceState::B, score)),
        }
    }
}

/// A loaded run input and how many rows were skipped on the way.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub input: RunInput,
    pub skipped_rows: usize,
}

/// Load the record sets named by `paths`.
pub fn load_run_input(
    paths: &RunPaths,
    score: &str,
    columns: &ColumnMap,
    quiet: bool,
) -> Result<LoadedInput> {
    let a = load_record_set(&paths.ref_a, ReferenceState::A, score, columns)
        .with_context(|| format!("loading reference state A for {score}"))?;
    let mut skipped_rows = a.skipped.len();
    let ref_b = match &paths.ref_b {
        Some(path) => {
            let b = load_record_set(path, ReferenceState::B, score, columns)
                .with_context(|| format!("loading reference state B for {score}"))?;
            skipped_rows += b.skipped.len();
            Some(b.set)
        }
        None => None,
    };

    if !quiet {
        tracing::info!(
            score,
            ref_a = a.set.len(),
            ref_b = ref_b.as_ref().map_or(0, |s| s.len()),
            skipped_rows,
            "Loaded score tables"
        );
    }

    Ok(LoadedInput {
        input: RunInput {
            ref_a: Some(a.set),
            ref_b,
        },
        skipped_rows,
    })
}

/// Load the configured group-name lookup, or an empty one when none is set.
///
/// A configured file that is missing is an error; every group would
/// otherwise silently render as "Unknown".
pub fn load_lookup(config: &AppConfig, override_path: Option<&Path>) -> Result<GroupNameLookup> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(|| config.data.lookup_path());
    match path {
        Some(path) => {
            let lookup = load_group_names(&path).context("loading group names")?;
            tracing::debug!(path = %path.display(), names = lookup.len(), "Loaded group names");
            Ok(lookup)
        }
        None => {
            tracing::debug!("No group-name lookup configured");
            Ok(GroupNameLookup::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;

    #[test]
    fn test_paths_for_target() {
        let config = AppConfig::builder()
            .data_dir("/data")
            .target("T1239", TargetConfig::with_scores(["GDT_TS"]).ref_b_tag("v1_1"))
            .build();

        let paths = RunPaths::for_target(&config, "T1239", "GDT_TS", Mode::MultiGroup);
        assert_eq!(paths.ref_a, PathBuf::from("/data/T1239_v1_GDT_TS_scores.csv"));
        assert_eq!(
            paths.ref_b,
            Some(PathBuf::from("/data/T1239_v1_1_GDT_TS_scores.csv"))
        );

        let single = RunPaths::for_target(&config, "T1239", "GDT_TS", Mode::SingleState);
        assert_eq!(single.ref_b, None);
    }

    #[test]
    fn test_load_run_input_counts_skipped_rows() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "Group,Model Number,TMscore\nTS010,1,0.8\nTS010,2,\n").unwrap();
        std::fs::write(&b, "Group,Model Number,TMscore\nTS010,1,0.7\n").unwrap();

        let loaded = load_run_input(
            &RunPaths::new(&a, Some(b)),
            "TMscore",
            &ColumnMap::default(),
            true,
        )
        .unwrap();
        assert_eq!(loaded.skipped_rows, 1);
        assert_eq!(loaded.input.ref_a.as_ref().map(|s| s.len()), Some(1));
        assert_eq!(loaded.input.ref_b.as_ref().map(|s| s.reference), Some(ReferenceState::B));
    }

    #[test]
    fn test_load_errors_name_the_reference_state() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "Group,Model Number,TMscore\nTS010,1,0.8\n").unwrap();
        std::fs::write(&b, "Group,Model Number,GDT_TS\nTS010,1,0.7\n").unwrap();

        let err = load_run_input(
            &RunPaths::new(&a, Some(b)),
            "TMscore",
            &ColumnMap::default(),
            true,
        )
        .unwrap_err();
        match err {
            crate::TwoStateError::Ingest { context, .. } => {
                assert!(
                    context.starts_with("loading reference state B for TMscore: reading "),
                    "{context}"
                );
            }
            other => panic!("expected ingest error, got {other:?}"),
        }

        let missing = load_run_input(
            &RunPaths::new(dir.path().join("absent.csv"), None),
            "TMscore",
            &ColumnMap::default(),
            true,
        )
        .unwrap_err();
        assert!(missing
            .to_string()
            .contains("loading reference state A for TMscore"));
    }

    #[test]
    fn test_load_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::builder().data_dir(dir.path()).build();
        assert!(load_lookup(&config, None).unwrap().is_empty());

        let config = AppConfig::builder()
            .data_dir(dir.path())
            .lookup_file(Some(PathBuf::from("groups.csv")))
            .build();
        assert!(load_lookup(&config, None).is_err());

        std::fs::write(
            dir.path().join("groups.csv"),
            "Group Number,Group Name\n10,Alpha\n",
        )
        .unwrap();
        let lookup = load_lookup(&config, None).unwrap();
        assert_eq!(lookup.len(), 1);
    }
}
