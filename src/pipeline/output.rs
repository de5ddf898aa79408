//! Output handling for reconciliation reports.
//!
//! Resolves where a rendered ranking goes and in which format.

use crate::reports::ReportFormat;
use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Where a rendered report is written.
#[derive(Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `None` means stdout.
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => OutputTarget::File(p),
            None => OutputTarget::Stdout,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OutputTarget::Stdout) && std::io::stdout().is_terminal()
    }
}

/// Resolve [`ReportFormat::Auto`] for `target`.
///
/// Interactive terminals get `interactive` (table for one run, summary for a
/// batch). Files and pipes get a machine-readable format: JSON when the file
/// name ends in `.json`, CSV otherwise.
pub fn auto_detect_format(
    format: ReportFormat,
    target: &OutputTarget,
    interactive: ReportFormat,
) -> ReportFormat {
    match format {
        ReportFormat::Auto => match target {
            OutputTarget::Stdout if target.is_terminal() => interactive,
            OutputTarget::File(path)
                if path
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("json")) =>
            {
                ReportFormat::Json
            }
            _ => ReportFormat::Csv,
        },
        other => other,
    }
}

/// Color is off with `--no-color` or when `NO_COLOR` is set.
pub fn should_use_color(no_color_flag: bool) -> bool {
    !no_color_flag && std::env::var("NO_COLOR").is_err()
}

/// Write a rendered report, creating missing parent directories.
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Report written to {}", path.display());
            }
            Ok(())
        }
    }
}
