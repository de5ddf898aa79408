//! Report output stage.
//!
//! Renders completed runs and writes them to stdout, a file, or one file
//! per run inside an output directory.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::reports::{
    create_reporter_with_options, ReportConfig, ReportFormat, ReportMetadata, RunReport,
};

use super::{auto_detect_format, should_use_color, write_output, CompletedRun, OutputTarget};

/// Metadata for one completed run.
pub fn report_metadata(run: &CompletedRun) -> ReportMetadata {
    ReportMetadata::for_run(&run.reconciliation, run.spec.engine.balance)
        .target(run.spec.target.as_str())
        .score_type(run.spec.score.as_str())
}

fn report_config(config: &AppConfig) -> ReportConfig {
    ReportConfig {
        max_rows: None,
        show_cells: config.output.show_cells,
        include_diagnostics: !config.behavior.quiet,
    }
}

/// Output a single run to `output.file` or stdout.
pub fn output_single(config: &AppConfig, run: &CompletedRun) -> Result<()> {
    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target, ReportFormat::Table);
    let reporter = create_reporter_with_options(format, should_use_color(config.output.no_color));

    let metadata = report_metadata(run);
    let report = reporter
        .generate_run_report(&RunReport::new(&metadata, &run.reconciliation), &report_config(config))
        .with_context(|| format!("Failed to render {}", metadata.label()))?;
    write_output(&report, &target, config.behavior.quiet)
}

/// Output a batch.
///
/// With `output.dir` each run goes to `{target}_{score}_{suffix}.{ext}`;
/// otherwise all runs go into one report.
pub fn output_batch(config: &AppConfig, runs: &[CompletedRun]) -> Result<()> {
    match &config.output.dir {
        Some(dir) => output_per_run(config, runs, dir),
        None => {
            let target = OutputTarget::from_option(config.output.file.clone());
            let format = match auto_detect_format(config.output.format, &target, ReportFormat::Summary)
            {
                // One CSV cannot hold several runs with their own headers.
                ReportFormat::Csv if runs.len() > 1 => ReportFormat::Json,
                other => other,
            };
            let reporter =
                create_reporter_with_options(format, should_use_color(config.output.no_color));

            let metadata: Vec<ReportMetadata> = runs.iter().map(report_metadata).collect();
            let reports: Vec<RunReport<'_>> = metadata
                .iter()
                .zip(runs)
                .map(|(m, r)| RunReport::new(m, &r.reconciliation))
                .collect();
            let rendered = reporter
                .generate_batch_report(&reports, &report_config(config))
                .context("Failed to render batch report")?;
            write_output(&rendered, &target, config.behavior.quiet)
        }
    }
}

fn output_per_run(config: &AppConfig, runs: &[CompletedRun], dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let format = match config.output.format {
        ReportFormat::Auto => ReportFormat::Csv,
        other => other,
    };
    let reporter = create_reporter_with_options(format, false);
    let report_config = report_config(config);

    for run in runs {
        let metadata = report_metadata(run);
        let rendered = reporter
            .generate_run_report(&RunReport::new(&metadata, &run.reconciliation), &report_config)
            .with_context(|| format!("Failed to render {}", metadata.label()))?;
        let path = dir.join(run.spec.output_file_name(format));
        write_output(&rendered, &OutputTarget::File(path), config.behavior.quiet)?;
    }
    Ok(())
}
