//! twostate-score: two-state score reconciliation for structure-prediction
//! assessment.
//!
//! Ranks predictor groups by their combined performance against two
//! reference conformations of the same target.

#![allow(clippy::too_many_lines, clippy::struct_excessive_bools)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twostate_score::{
    cli,
    config::{AppConfig, ConfigPreset, CONFIG_DIR_NAME, CONFIG_FILE_NAMES},
    reports::ReportFormat,
    scoring::{Mode, RankBy, RescalePolicy},
};

/// Build long version string with mode support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nPairing Modes:",
        "\n  multi-group   best of canonical and swapped version pairing",
        "\n  single-group  anchor on the stronger state, complement from another model",
        "\n  model-locked  one model scored against both states",
        "\n  single-state  reference A only",
        "\n\nOutput Formats:",
        "\n  table, summary, json, csv"
    )
}

#[derive(Parser)]
#[command(name = "twostate-score")]
#[command(version, long_version = build_long_version())]
#[command(about = "Two-state score reconciliation for structure-prediction assessment", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  A run ranked no groups (with --fail-on-empty)
    2  Some batch runs failed (with --continue-on-error)
    3  Error occurred

EXAMPLES:
    # Score one target from the configured data layout
    twostate-score score --target T1228 --score GDT_TS

    # Score two explicit tables
    twostate-score score --score TMscore --ref-a v1.csv --ref-b v2.csv -o csv

    # Run every configured target with balance scoring, one CSV per run
    twostate-score batch --preset balance --output-dir results/")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Engine options shared by `score` and `batch`
#[derive(Parser)]
struct EngineArgs {
    /// Start from a named preset (default, casp16, balance, dual-state)
    #[arg(long)]
    preset: Option<String>,

    /// Pairing mode
    #[arg(long)]
    mode: Option<Mode>,

    /// Rescale policy for every score type
    #[arg(long)]
    rescale: Option<RescalePolicy>,

    /// Compute balance and TSBI columns
    #[arg(long)]
    balance: bool,

    /// Ranking key
    #[arg(long)]
    rank_by: Option<RankBy>,

    /// Directory holding the score tables
    #[arg(long, env = "TWOSTATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Group-name lookup CSV (`Group Number`, `Group Name`)
    #[arg(long)]
    lookup: Option<PathBuf>,

    /// Exit with code 1 when a run ranks no groups
    #[arg(long)]
    fail_on_empty: bool,

    /// Include the four per-cell scores in the output
    #[arg(long)]
    show_cells: bool,
}

/// Arguments for the `score` subcommand
#[derive(Parser)]
struct ScoreArgs {
    /// Score type, e.g. `GDT_TS`
    #[arg(short, long)]
    score: String,

    /// Target whose tables are found through the data layout
    #[arg(short, long)]
    target: Option<String>,

    /// Score table for reference state A
    #[arg(long)]
    ref_a: Option<PathBuf>,

    /// Score table for reference state B
    #[arg(long)]
    ref_b: Option<PathBuf>,

    /// Output format (auto: table on a terminal, CSV otherwise)
    #[arg(short, long, default_value = "auto")]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,
}

/// Arguments for the `batch` subcommand
#[derive(Parser)]
struct BatchArgs {
    /// Targets to run (all configured targets if omitted)
    #[arg(short, long, value_delimiter = ',')]
    targets: Vec<String>,

    /// Score types to run instead of each target's configured list
    #[arg(short, long, value_delimiter = ',')]
    scores: Vec<String>,

    /// Output format (auto: summary on a terminal, JSON/CSV otherwise)
    #[arg(short, long, default_value = "auto")]
    output: ReportFormat,

    /// Output file for the combined report
    #[arg(short = 'O', long, conflicts_with = "output_dir")]
    output_file: Option<PathBuf>,

    /// Write one file per run into this directory
    #[arg(short = 'D', long)]
    output_dir: Option<PathBuf>,

    /// Keep going when a run fails to load or reconcile
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one score type for one target
    Score(ScoreArgs),

    /// Reconcile every configured target and score type in parallel
    Batch(BatchArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .twostate-score.yaml in the current directory
    Init {
        /// Preset to base the example on
        #[arg(long, default_value = "casp16")]
        preset: String,
    },
    /// Generate JSON Schema for the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_preset(name: &str) -> Result<ConfigPreset> {
    ConfigPreset::from_name(name).with_context(|| {
        let known: Vec<&str> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
        format!("unknown preset '{name}' (expected one of: {})", known.join(", "))
    })
}

/// Resolve the effective config: preset or file, then CLI overrides.
fn build_config(cli: &Cli, engine: &EngineArgs, overrides: AppConfig) -> Result<AppConfig> {
    let mut config = match &engine.preset {
        Some(name) => {
            let mut config = AppConfig::from_preset(parse_preset(name)?);
            if let Some((file_config, path)) = cli
                .config
                .as_deref()
                .map(|p| twostate_score::config::load_config_file(p).map(|c| (c, p)))
                .transpose()?
            {
                tracing::debug!("Layering {} over preset {name}", path.display());
                config.merge(&file_config);
            }
            config.merge(&overrides);
            config
        }
        None => {
            let (config, loaded_from) =
                AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);
            if let Some(path) = loaded_from {
                tracing::debug!("Loaded config from {}", path.display());
            }
            config
        }
    };

    if let Some(mode) = engine.mode {
        // An explicit mode beats per-target overrides too.
        config.engine.mode = mode;
        for target in config.targets.values_mut() {
            target.mode = None;
        }
    }
    if let Some(rescale) = engine.rescale {
        config.engine.rescale = rescale;
        config.engine.rescale_by_score.clear();
    }
    Ok(config)
}

fn engine_overrides(cli: &Cli, engine: &EngineArgs) -> AppConfig {
    let mut builder = AppConfig::builder()
        .balance(engine.balance)
        .no_color(cli.no_color)
        .quiet(cli.quiet);
    if let Some(rank_by) = engine.rank_by {
        builder = builder.rank_by(rank_by);
    }
    if let Some(dir) = &engine.data_dir {
        builder = builder.data_dir(dir.clone());
    }
    let mut config = builder.build();
    config.output.show_cells = engine.show_cells;
    config.behavior.fail_on_empty = engine.fail_on_empty;
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    // Dispatch to command handlers
    match &cli.command {
        Commands::Score(args) => {
            let mut overrides = engine_overrides(&cli, &args.engine);
            overrides.output.format = args.output;
            overrides.output.file.clone_from(&args.output_file);
            let config = build_config(&cli, &args.engine, overrides)?;

            let request = cli::ScoreRequest {
                target: args.target.clone(),
                score: args.score.clone(),
                ref_a: args.ref_a.clone(),
                ref_b: args.ref_b.clone(),
                lookup: args.engine.lookup.clone(),
            };
            exit_with(cli::run_score(&config, &request))
        }

        Commands::Batch(args) => {
            let mut overrides = engine_overrides(&cli, &args.engine);
            overrides.output.format = args.output;
            overrides.output.file.clone_from(&args.output_file);
            overrides.output.dir.clone_from(&args.output_dir);
            overrides.behavior.continue_on_error = args.continue_on_error;
            let config = build_config(&cli, &args.engine, overrides)?;

            let request = cli::BatchRequest {
                targets: args.targets.clone(),
                scores: args.scores.clone(),
                lookup: args.engine.lookup.clone(),
            };
            exit_with(cli::run_batch(&config, &request))
        }

        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "twostate-score", &mut io::stdout());
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    twostate_score::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml =
                    serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    ::dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME).display().to_string()),
                    ::dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match twostate_score::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init { preset } => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".twostate-score.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let config = AppConfig::from_preset(parse_preset(preset)?);
                let content = twostate_score::config::generate_example_config(&config);
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
            ConfigAction::Schema { output } => {
                let schema = twostate_score::config::generate_json_schema();
                match output {
                    Some(path) => {
                        std::fs::write(path, &schema)?;
                        eprintln!("Schema written to {}", path.display());
                    }
                    None => {
                        println!("{schema}");
                    }
                }
                Ok(())
            }
        },
    }
}

/// Exit with the handler's code, mapping errors to `ERROR`.
fn exit_with(result: Result<i32>) -> Result<()> {
    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::error!("{err:#}");
            std::process::exit(twostate_score::pipeline::exit_codes::ERROR)
        }
    }
}
