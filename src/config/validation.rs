//! Configuration validation for twostate-score.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{AppConfig, DataConfig, EngineConfig, OutputConfig, TargetConfig};
use crate::reports::ReportFormat;
use crate::scoring::{Mode, RankBy};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.engine.validate());
        errors.extend(self.data.validate());
        errors.extend(self.output.validate());

        for (name, target) in &self.targets {
            if name.trim().is_empty() {
                errors.push(ConfigError::new("targets", "Target names must not be empty"));
            }
            errors.extend(target.validate().into_iter().map(|e| ConfigError {
                field: format!("targets.{name}.{}", e.field),
                message: e.message,
            }));

            let tag_a = self.ref_tag(name, crate::model::ReferenceState::A);
            let tag_b = self.ref_tag(name, crate::model::ReferenceState::B);
            if tag_a == tag_b {
                errors.push(ConfigError::new(
                    format!("targets.{name}"),
                    format!("Both reference states resolve to file tag '{tag_a}'"),
                ));
            }
        }

        errors
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.rank_by == RankBy::Tsbi && !self.balance {
            errors.push(ConfigError::new(
                "engine.rank_by",
                "Ranking by tsbi requires engine.balance to be enabled",
            ));
        }
        if self.balance && self.mode == Mode::SingleState {
            errors.push(ConfigError::new(
                "engine.balance",
                "Balance needs both reference states; single-state mode has only one",
            ));
        }
        if self.rescale_by_score.keys().any(|k| k.trim().is_empty()) {
            errors.push(ConfigError::new(
                "engine.rescale_by_score",
                "Score type names must not be empty",
            ));
        }

        errors
    }
}

impl Validatable for DataConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for placeholder in ["{target}", "{tag}", "{score}"] {
            if !self.file_pattern.contains(placeholder) {
                errors.push(ConfigError::new(
                    "data.file_pattern",
                    format!("Pattern '{}' is missing {placeholder}", self.file_pattern),
                ));
            }
        }
        if self.ref_a_tag.trim().is_empty() || self.ref_b_tag.trim().is_empty() {
            errors.push(ConfigError::new(
                "data.ref_a_tag",
                "Reference file tags must not be empty",
            ));
        }

        let columns = [
            ("group", &self.columns.group),
            ("model_number", &self.columns.model_number),
            ("version", &self.columns.version),
        ];
        for (field, name) in columns {
            if name.trim().is_empty() {
                errors.push(ConfigError::new(
                    format!("data.columns.{field}"),
                    "Column name must not be empty",
                ));
            }
        }
        if self.columns.group == self.columns.model_number {
            errors.push(ConfigError::new(
                "data.columns",
                "Group and model number columns must differ",
            ));
        }

        errors
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.scores.is_empty() {
            errors.push(ConfigError::new("scores", "At least one score type is required"));
        }
        if self.scores.iter().any(|s| s.trim().is_empty()) {
            errors.push(ConfigError::new("scores", "Score type names must not be empty"));
        }
        if self.ref_b_fallback_tags.iter().any(|t| t.trim().is_empty()) {
            errors.push(ConfigError::new(
                "ref_b_fallback_tags",
                "Fallback tags must not be empty",
            ));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.file.is_some() && self.dir.is_some() {
            errors.push(ConfigError::new(
                "output",
                "Set either output.file or output.dir, not both",
            ));
        }
        if self.dir.is_some() && matches!(self.format, ReportFormat::Table | ReportFormat::Summary)
        {
            errors.push(ConfigError::new(
                "output.format",
                format!("Format '{}' cannot be written per run to a directory", self.format),
            ));
        }
        errors
    }
}
