//! Default configurations and presets for twostate-score.
//!
//! Provides named presets for common assessment setups.

use super::types::{AppConfig, EngineConfig, TargetConfig};
use crate::scoring::{Mode, RankBy, RescalePolicy};

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Multi-group pairing, no rescaling, no targets
    Default,
    /// CASP16 two-state targets with their file tags and single-group overrides
    Casp16,
    /// CASP16 targets ranked by the balance index
    Balance,
    /// CASP16 targets with one model evaluated against both states
    DualState,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Casp16 => "casp16",
            Self::Balance => "balance",
            Self::DualState => "dual-state",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "casp16" | "casp" | "two-state" => Some(Self::Casp16),
            "balance" | "tsbi" => Some(Self::Balance),
            "dual-state" | "dual" | "model-locked" => Some(Self::DualState),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Multi-group pairing with scores kept in their input units",
            Self::Casp16 => "CASP16 two-state targets, GDT_TS rescaled to percent",
            Self::Balance => "CASP16 targets ranked by the two-state balance index",
            Self::DualState => "CASP16 targets scoring one model against both states",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Casp16, Self::Balance, Self::DualState]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

/// Score type stored as a fraction in CASP16 tables.
pub const FRACTIONAL_SCORE: &str = "GDT_TS";

/// Default group-name lookup file name.
pub const DEFAULT_LOOKUP_FILE: &str = "group_number_name_correspondance.csv";

const COMPOSITE_SCORES: [&str; 4] = [
    "Composite_Score_1",
    "Composite_Score_2",
    "Composite_Score_3",
    "Composite_Score_4",
];

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Casp16 => Self::casp16_preset(),
            ConfigPreset::Balance => Self::balance_preset(),
            ConfigPreset::DualState => Self::dual_state_preset(),
        }
    }

    /// CASP16 two-state preset.
    ///
    /// - R1203 and T1214 have a single competing group
    /// - T1228 and T1239 keep their second reference under a different tag
    /// - GDT_TS tables hold fractions and are reported in percent
    #[must_use]
    pub fn casp16_preset() -> Self {
        let mut config = Self::default();
        config.engine = EngineConfig {
            rescale_by_score: [(FRACTIONAL_SCORE.to_string(), RescalePolicy::Percentage)]
                .into_iter()
                .collect(),
            ..EngineConfig::default()
        };
        config.data.lookup_file = Some(DEFAULT_LOOKUP_FILE.into());

        let docking = ["BestDockQ", "GDT_TS", "GlobDockQ", "GlobalLDDT", "TMscore"];
        let with_composites = |leading: &[&str]| -> Vec<String> {
            leading
                .iter()
                .chain(COMPOSITE_SCORES.iter())
                .map(|s| (*s).to_string())
                .collect()
        };

        let targets = [
            ("M1228", TargetConfig::with_scores(docking)),
            ("M1239", TargetConfig::with_scores(docking)),
            (
                "R1203",
                TargetConfig::with_scores(with_composites(&["GDT_TS", "GlobalLDDT", "TMscore"]))
                    .mode(Mode::SingleGroup),
            ),
            (
                "T1214",
                TargetConfig::with_scores(with_composites(&["GDT_TS", "GlobalLDDT", "TMscore"]))
                    .mode(Mode::SingleGroup),
            ),
            (
                "T1228",
                TargetConfig::with_scores(["GDT_TS", "GlobalLDDT", "TMscore"])
                    .ref_b_tag("v1_1")
                    .ref_b_fallback_tag("v2_1"),
            ),
            (
                "T1239",
                TargetConfig::with_scores(["GDT_TS", "GlobalLDDT", "TMscore"]).ref_b_tag("v1_1"),
            ),
            (
                "T1249",
                TargetConfig::with_scores(["AvgDockQ", "GlobalLDDT", "GDT_TS", "TMscore"]),
            ),
        ];
        config.targets = targets
            .into_iter()
            .map(|(name, target)| (name.to_string(), target))
            .collect();
        config
    }

    /// CASP16 targets with balance scoring, ranked by TSBI.
    #[must_use]
    pub fn balance_preset() -> Self {
        let mut config = Self::casp16_preset();
        config.engine.balance = true;
        config.engine.rank_by = RankBy::Tsbi;
        config
    }

    /// CASP16 targets in model-locked mode.
    ///
    /// Single-group overrides are dropped; every target locks the model.
    #[must_use]
    pub fn dual_state_preset() -> Self {
        let mut config = Self::casp16_preset();
        config.engine.mode = Mode::ModelLocked;
        for target in config.targets.values_mut() {
            target.mode = None;
        }
        config
    }
}
