//! sweep CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Deletion aborted

use std::process::ExitCode;

use clap::Parser;
use sweep_core::SweepError;
use sweep_inventory::InventoryError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const DELETION_ABORTED: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let result = match cli.command {
        Commands::Plan(args) => commands::plan::execute(args).await,
        Commands::Purge(args) => commands::purge::execute(args).await,
        Commands::List(args) => commands::list::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Initialize logging on stderr so stdout stays free for reports.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sweep={},warn", level)));

    let (plain, json) = if cli.log_json {
        let layer = fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr);
        (None, Some(layer))
    } else {
        let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
        (Some(layer), None)
    };

    // Fails only when a subscriber is already installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<SweepError>() {
            return match err {
                SweepError::InvalidConfiguration(_) | SweepError::InvalidFilter(_) => {
                    ExitCodes::CONFIG_ERROR
                }
                _ => ExitCodes::DELETION_ABORTED,
            };
        }
        if let Some(err) = cause.downcast_ref::<InventoryError>() {
            return match err {
                InventoryError::NotFound(_) => ExitCodes::INVALID_ARGS,
                _ => ExitCodes::CONFIG_ERROR,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}
