//! CLI command definitions.
//!
//! This module defines the command structure for the sweep CLI. Every
//! command reads an inventory snapshot and an optional run configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sweep_core::{CleanReport, Cleaner, CleanerConfig, ResourceRegistry};
use sweep_inventory::{Inventory, RunConfig};
use tracing::warn;

pub mod list;
pub mod output;
pub mod plan;
pub mod purge;

/// sweep - dependency-ordered cloud resource teardown
#[derive(Parser)]
#[command(name = "sweep")]
#[command(version, about = "sweep - dependency-ordered cloud resource teardown")]
#[command(long_about = r#"
sweep deletes the resources of an account in dependency order: dependants
before the resources they need, whole stacks before their members, with a
bounded pool of concurrent deletions per round.

COMMANDS:
  plan   → Dry run: print the rounds and the ordered deletion plan
  purge  → Delete every non-excluded resource
  list   → Show scanned resources and whether filters exclude them

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Deletion aborted
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what a purge would delete, in order
    Plan(plan::PlanArgs),

    /// Delete resources in dependency order
    Purge(purge::PurgeArgs),

    /// List scanned resources and their filter status
    List(list::ListArgs),
}

/// Where a run reads its resources and settings from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Inventory file listing the resources of the account
    #[arg(short, long, env = "SWEEP_INVENTORY")]
    pub inventory: PathBuf,

    /// Run configuration file (concurrency, retries, exclude filters)
    #[arg(short, long, env = "SWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the inventory and the run configuration (defaults if none given).
    pub fn load(&self) -> Result<(Inventory, RunConfig)> {
        let inventory = Inventory::load(&self.inventory)
            .with_context(|| format!("Failed to load inventory {}", self.inventory.display()))?;

        let config = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("Failed to load run configuration {}", path.display()))?,
            None => RunConfig::default(),
        };

        Ok((inventory, config))
    }
}

/// Run the cleaner and close the registry whatever the outcome.
pub async fn run_cleanup(
    mut registry: ResourceRegistry,
    config: CleanerConfig,
) -> Result<CleanReport> {
    let result = Cleaner::new(config).clean(&registry).await;

    let failures = registry.close();
    if failures > 0 {
        warn!(failures, "Some resource definitions failed to close");
    }

    result.context("Cleanup aborted")
}
