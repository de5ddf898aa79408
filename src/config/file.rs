//! Configuration file loading and discovery.
//!
//! YAML files are looked up in the working directory, the enclosing git
//! repository, the user config directory and the home directory, in that order.

use super::types::AppConfig;
use crate::reports::ReportFormat;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// File names tried in each search directory, most specific first.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".twostate-score.yaml",
    ".twostate-score.yml",
    "twostate-score.yaml",
    "twostate-score.yml",
];

/// Directory name under the user config directory.
pub const CONFIG_DIR_NAME: &str = "twostate-score";

/// First existing config file, or `None`.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/twostate-score/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let candidates = [
        std::env::current_dir().ok(),
        find_git_root(),
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME)),
        dirs::home_dir(),
    ];

    candidates
        .iter()
        .flatten()
        .find_map(|dir| find_config_in_dir(dir))
}

fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Nearest ancestor of the working directory holding `.git`.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Path `config init` writes to when none is given.
#[must_use]
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAMES[0])
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Why a config file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML in config file: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml_ng::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from the defaults override, so a sparse
    /// CLI-built config can be layered over a file config.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        // Engine config
        if other.engine.mode != defaults.engine.mode {
            self.engine.mode = other.engine.mode;
        }
        if other.engine.rescale != defaults.engine.rescale {
            self.engine.rescale = other.engine.rescale;
        }
        for (score, policy) in &other.engine.rescale_by_score {
            self.engine.rescale_by_score.insert(score.clone(), *policy);
        }
        if other.engine.balance {
            self.engine.balance = true;
        }
        if other.engine.rank_by != defaults.engine.rank_by {
            self.engine.rank_by = other.engine.rank_by;
        }

        // Data config
        if other.data.data_dir != defaults.data.data_dir {
            self.data.data_dir.clone_from(&other.data.data_dir);
        }
        if other.data.file_pattern != defaults.data.file_pattern {
            self.data.file_pattern.clone_from(&other.data.file_pattern);
        }
        if other.data.ref_a_tag != defaults.data.ref_a_tag {
            self.data.ref_a_tag.clone_from(&other.data.ref_a_tag);
        }
        if other.data.ref_b_tag != defaults.data.ref_b_tag {
            self.data.ref_b_tag.clone_from(&other.data.ref_b_tag);
        }
        if other.data.columns != defaults.data.columns {
            self.data.columns.clone_from(&other.data.columns);
        }
        if other.data.lookup_file.is_some() {
            self.data.lookup_file.clone_from(&other.data.lookup_file);
        }

        // Targets: entries replace same-named ones
        for (name, target) in &other.targets {
            self.targets.insert(name.clone(), target.clone());
        }

        // Output config - only override if explicitly set
        if other.output.format != ReportFormat::Auto {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if other.output.dir.is_some() {
            self.output.dir.clone_from(&other.output.dir);
        }
        if other.output.no_color {
            self.output.no_color = true;
        }
        if other.output.show_cells {
            self.output.show_cells = true;
        }

        // Behavior config (booleans - if set to true, override)
        if other.behavior.quiet {
            self.behavior.quiet = true;
        }
        if other.behavior.fail_on_empty {
            self.behavior.fail_on_empty = true;
        }
        if other.behavior.continue_on_error {
            self.behavior.continue_on_error = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content from a starting config.
#[must_use]
pub fn generate_example_config(config: &AppConfig) -> String {
    format!(
        r"# twostate-score configuration
# Place this file at .twostate-score.yaml in your project root or ~/.config/twostate-score/

{}",
        serde_yaml_ng::to_string(config).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# twostate-score configuration file
# ==================================
#
# Place it at:
#   - .twostate-score.yaml in your project root
#   - ~/.config/twostate-score/twostate-score.yaml for global config
#
# CLI arguments always override file settings.

# Reconciliation defaults
engine:
  # Mode: multi-group, single-group, model-locked, single-state
  mode: multi-group
  # Rescale: keep, percentage, detect-fraction
  rescale: keep
  # Per score type rescale policy
  rescale_by_score:
    GDT_TS: percentage
  # Add balance and TSBI columns
  balance: false
  # Ranking key: combined, tsbi
  rank_by: combined

# Score table layout
data:
  data_dir: ./DATA
  file_pattern: '{target}_{tag}_{score}_scores.csv'
  ref_a_tag: v1
  ref_b_tag: v2
  columns:
    group: Group
    model_number: Model Number
    version: Model Version
  # lookup_file: group_number_name_correspondance.csv

# Targets to run with `batch`
targets:
  T1228:
    scores: [GDT_TS, GlobalLDDT, TMscore]
    ref_b_tag: v1_1
    # Tried in order when the ref_b_tag table is missing
    ref_b_fallback_tags: [v2_1]
  R1203:
    scores: [GDT_TS, GlobalLDDT]
    mode: single-group

# Output configuration
output:
  # Format: auto, table, summary, json, csv
  format: auto
  # file: ranking.csv
  # dir: ./OUTPUT
  no_color: false
  show_cells: false

# Behavior flags
behavior:
  quiet: false
  # Exit with code 1 when a run ranks no groups
  fail_on_empty: false
  # Keep running the batch when one run cannot be loaded
  continue_on_error: false
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
