//! Configuration types for twostate-score runs.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ingest::{score_file_name, ColumnMap, DEFAULT_FILE_PATTERN};
use crate::model::ReferenceState;
use crate::reports::ReportFormat;
use crate::scoring::{Mode, RankBy, ReconciliationEngine, RescalePolicy};

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Reconciliation policy defaults
    pub engine: EngineConfig,
    /// Where score tables live and how they are laid out
    pub data: DataConfig,
    /// Per-target score types and overrides, in run order
    pub targets: IndexMap<String, TargetConfig>,
    /// Output configuration (format, destination, colors)
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Engine for one (target, score type) run.
    ///
    /// A target's mode overrides the default mode; a score type's rescale
    /// policy overrides the default policy.
    #[must_use]
    pub fn engine_for(&self, target: Option<&str>, score: &str) -> ReconciliationEngine {
        let mode = target
            .and_then(|t| self.targets.get(t))
            .and_then(|t| t.mode)
            .unwrap_or(self.engine.mode);
        let rescale = self
            .engine
            .rescale_by_score
            .get(score)
            .copied()
            .unwrap_or(self.engine.rescale);

        ReconciliationEngine::new(mode)
            .with_rescale(rescale)
            .with_balance(self.engine.balance)
            .with_rank_by(self.engine.rank_by)
    }

    /// File tag for `reference`, honoring per-target overrides.
    #[must_use]
    pub fn ref_tag(&self, target: &str, reference: ReferenceState) -> &str {
        let target_cfg = self.targets.get(target);
        let tag = match reference {
            ReferenceState::A => target_cfg.and_then(|t| t.ref_a_tag.as_deref()),
            ReferenceState::B => target_cfg.and_then(|t| t.ref_b_tag.as_deref()),
        };
        tag.unwrap_or_else(|| self.data.default_tag(reference))
    }

    /// Path of the score table for one target, reference state and score type.
    ///
    /// When the target lists B fallback tags, the first tag whose file exists
    /// wins. With no existing candidate the primary tag's path is returned so
    /// the loader reports it.
    #[must_use]
    pub fn score_path(&self, target: &str, reference: ReferenceState, score: &str) -> PathBuf {
        let path_for = |tag: &str| {
            self.data
                .data_dir
                .join(score_file_name(&self.data.file_pattern, target, tag, score))
        };
        let primary = path_for(self.ref_tag(target, reference));

        let fallbacks: &[String] = match (reference, self.targets.get(target)) {
            (ReferenceState::B, Some(t)) => t.ref_b_fallback_tags.as_slice(),
            _ => &[],
        };
        if fallbacks.is_empty() || primary.exists() {
            return primary;
        }
        match fallbacks.iter().map(|tag| path_for(tag)).find(|p| p.exists()) {
            Some(found) => {
                tracing::debug!(path = %found.display(), "{target}: using fallback B tag");
                found
            }
            None => primary,
        }
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the default reconciliation mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.engine.mode = mode;
        self
    }

    /// Set the default rescale policy.
    pub fn rescale(mut self, rescale: RescalePolicy) -> Self {
        self.config.engine.rescale = rescale;
        self
    }

    /// Set the rescale policy for one score type.
    pub fn rescale_score(mut self, score: impl Into<String>, rescale: RescalePolicy) -> Self {
        self.config.engine.rescale_by_score.insert(score.into(), rescale);
        self
    }

    /// Enable balance (TSBI) scoring.
    pub fn balance(mut self, enabled: bool) -> Self {
        self.config.engine.balance = enabled;
        self
    }

    /// Set the ranking key.
    pub fn rank_by(mut self, rank_by: RankBy) -> Self {
        self.config.engine.rank_by = rank_by;
        self
    }

    /// Set the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data.data_dir = dir.into();
        self
    }

    /// Set the group-name lookup file.
    pub fn lookup_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.data.lookup_file = file;
        self
    }

    /// Add or replace a target.
    pub fn target(mut self, name: impl Into<String>, target: TargetConfig) -> Self {
        self.config.targets.insert(name.into(), target);
        self
    }

    /// Set the output format.
    pub fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Disable colored output.
    pub fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Enable quiet mode.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Engine Configuration
// ============================================================================

/// Default reconciliation policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Pairing mode: multi-group, single-group, model-locked, single-state
    pub mode: Mode,
    /// Rescale policy for score types without an entry in `rescale_by_score`
    pub rescale: RescalePolicy,
    /// Rescale policy per score type, e.g. `GDT_TS: percentage`
    pub rescale_by_score: IndexMap<String, RescalePolicy>,
    /// Compute balance and TSBI columns
    pub balance: bool,
    /// Ranking key: combined or tsbi
    pub rank_by: RankBy,
}

// ============================================================================
// Data Layout Configuration
// ============================================================================

/// Location and layout of score tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the score tables
    pub data_dir: PathBuf,
    /// File-name pattern with `{target}`, `{tag}` and `{score}` placeholders
    pub file_pattern: String,
    /// File tag for reference state A
    pub ref_a_tag: String,
    /// File tag for reference state B
    pub ref_b_tag: String,
    /// Column names inside score tables
    pub columns: ColumnMap,
    /// CSV with `Group Number` and `Group Name` columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_file: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            ref_a_tag: "v1".to_string(),
            ref_b_tag: "v2".to_string(),
            columns: ColumnMap::default(),
            lookup_file: None,
        }
    }
}

impl DataConfig {
    #[must_use]
    pub fn default_tag(&self, reference: ReferenceState) -> &str {
        match reference {
            ReferenceState::A => &self.ref_a_tag,
            ReferenceState::B => &self.ref_b_tag,
        }
    }

    /// Resolve the lookup file against the data directory when relative.
    #[must_use]
    pub fn lookup_path(&self) -> Option<PathBuf> {
        self.lookup_file.as_deref().map(|p| resolve_in(&self.data_dir, p))
    }
}

fn resolve_in(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

// ============================================================================
// Target Configuration
// ============================================================================

/// Settings for one assessment target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TargetConfig {
    /// Score types to reconcile for this target
    pub scores: Vec<String>,
    /// Mode override, e.g. single-group for targets with one competitor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// File tag override for reference state A
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_a_tag: Option<String>,
    /// File tag override for reference state B
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_b_tag: Option<String>,
    /// B tags tried in order when the primary B table does not exist
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ref_b_fallback_tags: Vec<String>,
}

impl TargetConfig {
    pub fn with_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scores: scores.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn ref_b_tag(mut self, tag: impl Into<String>) -> Self {
        self.ref_b_tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn ref_b_fallback_tag(mut self, tag: impl Into<String>) -> Self {
        self.ref_b_fallback_tags.push(tag.into());
        self
    }
}

// ============================================================================
// Output and Behavior Configuration
// ============================================================================

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path for single runs (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Directory for batch outputs, one file per run (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
    /// Include the four per-cell scores in table output
    pub show_cells: bool,
}

/// Behavior flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress non-essential output
    pub quiet: bool,
    /// Exit with a distinct code when a run ranks no groups
    pub fail_on_empty: bool,
    /// Keep going when one batch run fails to load
    pub continue_on_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_for_applies_overrides() {
        let config = AppConfig::builder()
            .rescale_score("GDT_TS", RescalePolicy::Percentage)
            .balance(true)
            .target(
                "R1203",
                TargetConfig::with_scores(["GDT_TS"]).mode(Mode::SingleGroup),
            )
            .build();

        let engine = config.engine_for(Some("R1203"), "GDT_TS");
        assert_eq!(engine.mode, Mode::SingleGroup);
        assert_eq!(engine.rescale, RescalePolicy::Percentage);
        assert!(engine.balance);

        let engine = config.engine_for(Some("T1249"), "TMscore");
        assert_eq!(engine.mode, Mode::MultiGroup);
        assert_eq!(engine.rescale, RescalePolicy::Keep);

        let engine = config.engine_for(None, "GDT_TS");
        assert_eq!(engine.mode, Mode::MultiGroup);
    }

    #[test]
    fn test_score_path_uses_tag_overrides() {
        let config = AppConfig::builder()
            .data_dir("/data")
            .target("T1228", TargetConfig::with_scores(["TMscore"]).ref_b_tag("v2_1"))
            .build();

        assert_eq!(
            config.score_path("T1228", ReferenceState::A, "TMscore"),
            PathBuf::from("/data/T1228_v1_TMscore_scores.csv")
        );
        assert_eq!(
            config.score_path("T1228", ReferenceState::B, "TMscore"),
            PathBuf::from("/data/T1228_v2_1_TMscore_scores.csv")
        );
        assert_eq!(
            config.score_path("T1249", ReferenceState::B, "TMscore"),
            PathBuf::from("/data/T1249_v2_TMscore_scores.csv")
        );
    }

    #[test]
    fn test_score_path_falls_back_to_existing_b_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::builder()
            .data_dir(dir.path())
            .target(
                "T1228",
                TargetConfig::with_scores(["GDT_TS"])
                    .ref_b_tag("v1_1")
                    .ref_b_fallback_tag("v2_1"),
            )
            .build();
        let v1_1 = dir.path().join("T1228_v1_1_GDT_TS_scores.csv");
        let v2_1 = dir.path().join("T1228_v2_1_GDT_TS_scores.csv");

        // Nothing on disk: the primary tag is reported.
        assert_eq!(config.score_path("T1228", ReferenceState::B, "GDT_TS"), v1_1);

        std::fs::write(&v2_1, "Group,Model Number,GDT_TS\n").unwrap();
        assert_eq!(config.score_path("T1228", ReferenceState::B, "GDT_TS"), v2_1);

        std::fs::write(&v1_1, "Group,Model Number,GDT_TS\n").unwrap();
        assert_eq!(config.score_path("T1228", ReferenceState::B, "GDT_TS"), v1_1);

        // Fallbacks never apply to reference state A.
        assert_eq!(
            config.score_path("T1228", ReferenceState::A, "GDT_TS"),
            dir.path().join("T1228_v1_GDT_TS_scores.csv")
        );
    }

    #[test]
    fn test_lookup_path_is_relative_to_data_dir() {
        let mut config = AppConfig::builder().data_dir("/data").build();
        assert_eq!(config.data.lookup_path(), None);

        config.data.lookup_file = Some(PathBuf::from("groups.csv"));
        assert_eq!(config.data.lookup_path(), Some(PathBuf::from("/data/groups.csv")));

        config.data.lookup_file = Some(PathBuf::from("/etc/groups.csv"));
        assert_eq!(config.data.lookup_path(), Some(PathBuf::from("/etc/groups.csv")));
    }
}
