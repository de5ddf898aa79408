//! Configuration module for twostate-score.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common assessment setups
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use twostate_score::config::{AppConfig, ConfigPreset};
//!
//! let config = AppConfig::from_preset(ConfigPreset::Casp16);
//!
//! let config = AppConfig::builder()
//!     .mode(Mode::SingleGroup)
//!     .rescale_score("GDT_TS", RescalePolicy::Percentage)
//!     .balance(true)
//!     .build();
//!
//! use twostate_score::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.twostate-score.yaml` file in your project root or
//! `~/.config/twostate-score/`:
//!
//! ```yaml
//! engine:
//!   mode: multi-group
//!   rescale_by_score:
//!     GDT_TS: percentage
//! data:
//!   data_dir: ./DATA
//! targets:
//!   T1228:
//!     scores: [GDT_TS, TMscore]
//!     ref_b_tag: v2_1
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{ConfigPreset, DEFAULT_LOOKUP_FILE, FRACTIONAL_SCORE};
pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, DataConfig, EngineConfig, OutputConfig,
    TargetConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    default_config_path, discover_config_file, generate_example_config,
    generate_full_example_config, load_config_file, load_or_default, ConfigFileError,
    CONFIG_DIR_NAME, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and autocomplete `.twostate-score.yaml`.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_names_sections() {
        let schema = generate_json_schema();
        assert!(schema.contains("\"engine\""));
        assert!(schema.contains("\"targets\""));
        assert!(schema.contains("rescale_by_score"));
    }
}
