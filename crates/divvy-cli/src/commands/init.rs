//! `divvy init` — Write a default configuration and an empty ledger.

use clap::Args;
use std::path::{Path, PathBuf};

use divvy_netting::LedgerSnapshot;

use crate::config::DivvyConfig;
use crate::ledger_file;

const LEDGER_FILE: &str = "divvy-ledger.json";

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &InitArgs, config_name: &Path) -> anyhow::Result<()> {
    let config_path = args.dir.join(config_name);

    if config_path.exists() {
        anyhow::bail!("configuration file already exists at {}", config_path.display());
    }

    std::fs::create_dir_all(&args.dir)?;

    // Absolute path: relative ones resolve against the caller's cwd.
    let dir = std::fs::canonicalize(&args.dir)?;
    let mut config = DivvyConfig::default();
    config.ledger.path = dir.join(LEDGER_FILE);
    config.save(&config_path)?;
    println!("Wrote configuration to {}", config_path.display());

    let ledger_path = &config.ledger.path;
    if !ledger_path.exists() {
        ledger_file::save(ledger_path, &LedgerSnapshot::default())?;
        println!("Created empty ledger at {}", ledger_path.display());
    }

    println!("Run 'divvy add' to record a debt or 'divvy split <bill.json>' to split a bill.");
    Ok(())
}
