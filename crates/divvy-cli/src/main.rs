//! Divvy CLI — Split shared bills and net mutual debts from the command line.
//!
//! Subcommands: init, split, add, balance, net, reverse, settlements.

mod commands;
mod config;
mod ledger_file;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::DivvyConfig;

/// Divvy — Fair splits, fewer transfers.
#[derive(Parser, Debug)]
#[command(name = "divvy", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(long, global = true, default_value = "divvy.toml")]
    config: PathBuf,

    /// Override the ledger file path.
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration and an empty ledger.
    Init(commands::init::InitArgs),
    /// Split a bill and list the transfers that settle it.
    Split(commands::split::SplitArgs),
    /// Record a debt with a counterparty.
    Add(commands::add::AddArgs),
    /// Show open balances per counterparty.
    Balance(commands::balance::BalanceArgs),
    /// Net the mutual debts with a counterparty.
    Net(commands::net::NetArgs),
    /// Reverse a recorded settlement.
    Reverse(commands::reverse::ReverseArgs),
    /// List recorded settlements.
    Settlements(commands::settlements::SettlementsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DivvyConfig::load(&cli.config)?;
    if let Some(ledger) = &cli.ledger {
        config.ledger.path = ledger.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config),
        Commands::Split(args) => commands::split::run(args, &config),
        Commands::Add(args) => commands::add::run(args, &config),
        Commands::Balance(args) => commands::balance::run(args, &config).await,
        Commands::Net(args) => commands::net::run(args, &config).await,
        Commands::Reverse(args) => commands::reverse::run(args, &config).await,
        Commands::Settlements(args) => commands::settlements::run(args, &config).await,
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(config: &DivvyConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}
