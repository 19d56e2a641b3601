//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use gatecalc_core::{EvaluationReport, ProgressReporter, RunConfig};
use gatecalc_documents::ResponseSource;
use gatecalc_shared::{
    AppConfig, FallbackPolicy, FetchOptions, init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::render::{OutputFormat, render_json, render_text};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// gatecalc: GATE marks calculator.
#[derive(Parser)]
#[command(
    name = "gatecalc",
    version,
    about = "Score a GATE response sheet against the master answer key.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Score a response sheet.
    Score {
        /// Master answer key (.pdf or .html).
        #[arg(long)]
        answer_key: PathBuf,

        /// Master question paper (.pdf or plain text), read for mark bands.
        #[arg(long)]
        question_paper: PathBuf,

        /// Candidate response sheet: http(s) URL or local HTML file.
        #[arg(long)]
        response_sheet: String,

        /// Print the per-question breakdown.
        #[arg(long)]
        detailed: bool,

        /// Output format (defaults to the config file's `defaults.format`).
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Config file to use instead of ~/.gatecalc/gatecalc.toml.
        #[arg(long, env = "GATECALC_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show {
        /// Config file to show instead of the default location.
        #[arg(long, env = "GATECALC_CONFIG")]
        config: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so stdout carries only the score output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "gatecalc=warn",
        1 => "gatecalc=info",
        2 => "gatecalc=debug",
        _ => "gatecalc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Score {
            answer_key,
            question_paper,
            response_sheet,
            detailed,
            format,
            config,
        } => {
            let args = ScoreArgs {
                answer_key,
                question_paper,
                response_sheet,
                detailed,
                format,
            };
            cmd_score(args, config.as_deref()).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show { config } => cmd_config_show(config.as_deref()).await,
        },
    }
}

struct ScoreArgs {
    answer_key: PathBuf,
    question_paper: PathBuf,
    response_sheet: String,
    detailed: bool,
    format: Option<OutputFormat>,
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_score(args: ScoreArgs, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;

    let format = match args.format {
        Some(format) => format,
        None => config
            .defaults
            .format
            .parse::<OutputFormat>()
            .map_err(|e| eyre!("invalid defaults.format in config: {e}"))?,
    };
    let detailed = args.detailed || config.defaults.detailed;

    let response_sheet: ResponseSource = args.response_sheet.parse()?;

    let run_config = RunConfig {
        answer_key: args.answer_key,
        question_paper: args.question_paper,
        response_sheet,
        policy: FallbackPolicy::from(&config),
        fetch: FetchOptions::from(&config),
    };

    info!(
        answer_key = %run_config.answer_key.display(),
        question_paper = %run_config.question_paper.display(),
        response_sheet = %run_config.response_sheet,
        "scoring response sheet"
    );

    let reporter = CliProgress::new();
    let report = gatecalc_core::run(&run_config, &reporter).await;
    reporter.clear();
    let report = report?;

    let output = match format {
        OutputFormat::Text => render_text(&report, detailed),
        OutputFormat::Json => render_json(&report)?,
    };
    print!("{output}");

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &EvaluationReport) {
        self.spinner.finish_and_clear();
    }
}
