//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod batch;
mod score;

pub use batch::{run_batch, BatchRequest};
pub use score::{run_score, ScoreRequest};

// Re-export config types used by handlers
pub use crate::config::AppConfig;

use crate::config::Validatable;
use anyhow::{bail, Result};

/// Refuse to run with an invalid configuration, logging every problem.
fn ensure_valid(config: &AppConfig) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        tracing::error!("{error}");
    }
    bail!(
        "invalid configuration: {} problem{} found",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Mode, RankBy};

    #[test]
    fn test_ensure_valid() {
        assert!(ensure_valid(&AppConfig::default()).is_ok());

        let config = AppConfig::builder()
            .mode(Mode::SingleState)
            .balance(true)
            .rank_by(RankBy::Tsbi)
            .build();
        let err = ensure_valid(&config).unwrap_err();
        assert!(err.to_string().contains("1 problem found"));
    }
}
