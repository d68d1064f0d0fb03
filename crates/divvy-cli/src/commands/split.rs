//! `divvy split` — Split a bill and work out who pays whom.

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use divvy_core::Currency;
use divvy_netting::{Debt, DebtKind};
use divvy_split::{Bill, IndividualContribution, SettlementMatcher, SplitCalculator, Transfer};

use crate::config::DivvyConfig;
use crate::ledger_file;

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Bill file (JSON with `total`, `currency` and `participants`).
    pub bill: PathBuf,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Record the transfers involving this participant ID as debts in the ledger.
    #[arg(long, value_name = "PARTICIPANT_ID")]
    pub record_for: Option<String>,
}

#[derive(Serialize)]
struct SplitOutput<'a> {
    currency: &'a Currency,
    contributions: &'a [IndividualContribution],
    transfers: &'a [Transfer],
}

pub fn run(args: &SplitArgs, config: &DivvyConfig) -> anyhow::Result<()> {
    run_to(args, config, &mut std::io::stdout().lock())
}

/// With `--json`, nothing but the JSON document is written to `out`.
fn run_to(args: &SplitArgs, config: &DivvyConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(&args.bill)
        .with_context(|| format!("failed to read bill {}", args.bill.display()))?;
    let bill: Bill = serde_json::from_str(&contents)
        .with_context(|| format!("bill {} is not valid", args.bill.display()))?;

    let calculator = SplitCalculator::new(config.split);
    let contributions = calculator.compute_bill(&bill)?;
    let transfers = SettlementMatcher::new(config.matching).match_balances(&contributions);
    tracing::info!(
        participants = contributions.len(),
        transfers = transfers.len(),
        "bill split"
    );

    if args.json {
        let output = SplitOutput {
            currency: &bill.currency,
            contributions: &contributions,
            transfers: &transfers,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        print_table(out, &bill.currency, &contributions, &transfers)?;
    }

    if let Some(me) = &args.record_for {
        let debts = debts_for_participant(me, &bill.currency, &transfers);
        if debts.is_empty() {
            tracing::info!(participant = %me, "no transfers to record");
            if !args.json {
                writeln!(out, "No transfers involve {me}; nothing recorded.")?;
            }
            return Ok(());
        }
        let mut snapshot = ledger_file::load(&config.ledger.path)?;
        let recorded = debts.len();
        snapshot.debts.extend(debts);
        ledger_file::save(&config.ledger.path, &snapshot)?;
        if !args.json {
            writeln!(
                out,
                "Recorded {recorded} debt(s) for {me} in {}",
                config.ledger.path.display()
            )?;
        }
    }

    Ok(())
}

fn print_table(
    out: &mut dyn Write,
    currency: &Currency,
    contributions: &[IndividualContribution],
    transfers: &[Transfer],
) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>14} {:>14} {:>14}  {}",
        "PARTICIPANT", "PAID", "SHOULD PAY", "BALANCE", "METHOD"
    )?;
    for c in contributions {
        writeln!(
            out,
            "{:<20} {:>14} {:>14} {:>14}  {}",
            c.name,
            currency.format(c.paid),
            currency.format(c.should_pay),
            currency.format(c.balance),
            c.method
        )?;
    }
    writeln!(out)?;

    if transfers.is_empty() {
        return writeln!(out, "Everyone is square.");
    }
    writeln!(out, "Transfers:")?;
    for t in transfers {
        writeln!(out, "  {} -> {}: {}", t.from, t.to, currency.format(t.amount))?;
    }
    Ok(())
}

/// Translate transfers into debts from the point of view of `participant_id`.
/// Transfers between two other participants are skipped.
fn debts_for_participant(participant_id: &str, currency: &Currency, transfers: &[Transfer]) -> Vec<Debt> {
    let now = Utc::now();
    transfers
        .iter()
        .filter_map(|t| {
            let (kind, other_id, other_name) = if t.from_id == participant_id {
                (DebtKind::Iou, &t.to_id, &t.to)
            } else if t.to_id == participant_id {
                (DebtKind::Uome, &t.from_id, &t.from)
            } else {
                return None;
            };
            let counterparty = if other_id.is_empty() { other_name } else { other_id };
            Some(Debt::new(
                counterparty.as_str().into(),
                kind,
                t.amount,
                currency.clone(),
                now,
            ))
        })
        .collect()
}
