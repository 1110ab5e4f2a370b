//! Command-line interface definitions.
//!
//! Running the binary without a subcommand starts the bot, so the container
//! entrypoint needs no arguments.

pub mod check;
pub mod output;
pub mod run;
pub mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

/// Telegram session vault bot.
#[derive(Parser, Debug)]
#[command(name = "sessionvault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bot (default)
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// Show vault statistics from the database
    Stats(StatsArgs),
}

/// Subcommands for `sessionvault check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration and environment
    Config,
    /// Verify the bot token and channel access
    Telegram,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `stats` subcommand.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Path to the vault database (default: configured DB_PATH)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

/// Dispatch the parsed command line.
///
/// # Errors
/// Returns the error of the executed command.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.color {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
    output::configure(output::OutputConfig {
        json: cli.json,
        quiet: cli.quiet,
    });

    let config_path = cli.config.as_deref();
    match cli.command {
        None => run::execute(config_path, &RunArgs::default()).await,
        Some(Commands::Run(args)) => run::execute(config_path, &args).await,
        Some(Commands::Check(CheckCommand::Config)) => check::execute_config(config_path),
        Some(Commands::Check(CheckCommand::Telegram)) => {
            check::execute_telegram(config_path).await
        }
        Some(Commands::Stats(args)) => stats::execute(config_path, &args),
    }
}
