//! Report rendering shared by the commands.

use anyhow::Result;
use sweep_core::CleanReport;

/// Print the report as pretty JSON.
pub fn print_json(report: &CleanReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Print per-type scan counts and the run totals.
pub fn print_summary(report: &CleanReport) {
    let mode = if report.dry_run { "dry run" } else { "purge" };
    println!("📋 Run {} ({})", report.run_id, mode);

    for summary in &report.types {
        println!(
            "   {}: found {}, excluded {}, to delete {}",
            summary.resource_type, summary.found, summary.filtered, summary.to_delete
        );
    }

    if let Some(completed_at) = report.completed_at {
        let elapsed = completed_at - report.started_at;
        println!(
            "   {} round(s), {} failed attempt(s), {} ms",
            report.rounds.len(),
            report.failed_attempts,
            elapsed.num_milliseconds()
        );
    }
}

/// Print each round's batch.
pub fn print_rounds(report: &CleanReport) {
    println!();
    for round in &report.rounds {
        println!(
            "🔁 Round {}: {} deleted, {} failed",
            round.round, round.deleted, round.failed
        );
        for id in &round.batch {
            println!("   - {}", id);
        }
    }
}

/// Print the ordered dry-run plan.
pub fn print_plan(report: &CleanReport) {
    if report.plan.is_empty() {
        println!();
        println!("✅ Nothing to delete");
        return;
    }

    println!();
    println!("🗒️  Deletion plan:");
    for entry in &report.plan {
        println!(
            "   {:>3}. {} ({}) {}",
            entry.ordinal, entry.resource_id, entry.resource_type, entry.name
        );
    }
}
