//! `divvy settlements` — List recorded settlements.

use clap::Args;
use divvy_netting::CounterpartyId;

use crate::config::DivvyConfig;
use crate::ledger_file;

#[derive(Args, Debug)]
pub struct SettlementsArgs {
    /// Only list settlements with this counterparty.
    #[arg(short = 'p', long)]
    pub counterparty: Option<String>,

    /// Print the settlements as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: &SettlementsArgs, config: &DivvyConfig) -> anyhow::Result<()> {
    let (_ledger, manager) = ledger_file::open(&config.ledger.path, config.netting.clone())?;
    let counterparty = args.counterparty.as_deref().map(CounterpartyId::new);
    let settlements = manager.settlements(counterparty.as_ref()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&settlements)?);
        return Ok(());
    }

    if settlements.is_empty() {
        println!("No settlements recorded.");
        return Ok(());
    }

    println!("{:<38} {:<20} {:>16}  {}", "ID", "COUNTERPARTY", "AMOUNT", "DATE");
    for s in &settlements {
        println!(
            "{:<38} {:<20} {:>16}  {}",
            s.id.to_string(),
            s.counterparty.to_string(),
            s.currency.format(s.amount_settled),
            s.date.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}
