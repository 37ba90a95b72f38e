//! List command - Show scanned resources and their filter status.

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use sweep_core::is_excluded;
use sweep_inventory::DeletionLedger;

use super::SourceArgs;

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    source: SourceArgs,
}

pub async fn execute(args: ListArgs) -> Result<()> {
    let (inventory, run_config) = args.source.load()?;
    let excludes = run_config.to_cleaner_config(true).excludes;
    let mut registry = inventory.to_registry(&DeletionLedger::new());

    let mut total = 0;
    let mut excluded = 0;
    for definition in registry.definitions() {
        let resources = definition
            .scanner()
            .scan()
            .await
            .with_context(|| format!("Failed to scan {}", definition.resource_type()))?;

        println!("📦 {} ({})", definition.resource_type(), resources.len());
        for resource in &resources {
            total += 1;
            if is_excluded(&excludes, resource) {
                excluded += 1;
                println!("   ⏭️  {} [excluded]", resource.id);
            } else {
                println!("   🗑️  {}", resource.id);
            }
        }
    }

    let failures = registry.close();
    if failures > 0 {
        warn!(failures, "Some resource definitions failed to close");
    }

    println!();
    println!(
        "{} resource(s), {} excluded, {} to delete",
        total,
        excluded,
        total - excluded
    );
    Ok(())
}
