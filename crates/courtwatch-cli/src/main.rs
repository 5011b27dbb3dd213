mod check;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "courtwatch")]
#[command(about = "Check activity availability on the Better booking API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch availability for the configured search and write the slots
    Check(CheckArgs),
    /// Validate the search configuration and print it with header values redacted
    Config {
        /// Search config file (overrides `COURTWATCH_CONFIG_PATH`)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Search config file (overrides `COURTWATCH_CONFIG_PATH`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of days to query, starting today (overrides the config file)
    #[arg(long, env = "COURTWATCH_DAYS")]
    days: Option<u32>,

    /// Output format for the normalized slots
    #[arg(long, value_enum, env = "COURTWATCH_FORMAT", default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(long, env = "COURTWATCH_OUTPUT")]
    output: Option<PathBuf>,

    /// Drop records that fail coercion instead of aborting the run
    #[arg(long, env = "COURTWATCH_SKIP_INVALID")]
    skip_invalid: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = courtwatch_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(args) => check::run_check(&config, args).await,
        Commands::Config { config: path } => check::run_show_config(&config, path.as_deref()),
    }
}
