//! Plan command - Dry run over an inventory.

use anyhow::Result;
use clap::Args;
use tracing::info;

use sweep_inventory::DeletionLedger;

use super::{output, run_cleanup, SourceArgs};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Number of concurrent deletions per round
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: PlanArgs) -> Result<()> {
    info!("Planning deletion for {}", args.source.inventory.display());

    let (inventory, run_config) = args.source.load()?;
    let config = run_config
        .with_concurrency(args.concurrency)
        .to_cleaner_config(true);

    let registry = inventory.to_registry(&DeletionLedger::new());
    let report = run_cleanup(registry, config).await?;

    if args.json {
        output::print_json(&report)?;
    } else {
        output::print_summary(&report);
        output::print_rounds(&report);
        output::print_plan(&report);
    }

    Ok(())
}
