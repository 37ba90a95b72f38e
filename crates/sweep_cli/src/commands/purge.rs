//! Purge command - Delete every non-excluded resource.

use anyhow::Result;
use clap::Args;
use tracing::info;

use sweep_inventory::DeletionLedger;

use super::{output, run_cleanup, SourceArgs};

#[derive(Args)]
pub struct PurgeArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Number of concurrent deletions per round
    #[arg(long)]
    concurrency: Option<usize>,

    /// Abort once a resource has failed this many attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: PurgeArgs) -> Result<()> {
    info!("Purging resources from {}", args.source.inventory.display());

    let (inventory, run_config) = args.source.load()?;
    let config = run_config
        .with_concurrency(args.concurrency)
        .with_max_attempts(args.max_attempts)
        .to_cleaner_config(false);

    let ledger = DeletionLedger::new();
    let registry = inventory.to_registry(&ledger);
    let report = run_cleanup(registry, config).await?;

    if args.json {
        output::print_json(&report)?;
    } else {
        output::print_summary(&report);
        output::print_rounds(&report);
        println!();
        println!("✅ Deleted {} resource(s)", ledger.len());
    }

    Ok(())
}
