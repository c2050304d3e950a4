//! Export command implementation
//!
//! Runs exactly one export step and maps its result onto the exit code a
//! scheduler can act on.

use crate::config::load_config;
use crate::core::export::{ExportCoordinator, StepOutcome, StepSummary};
use crate::domain::errors::EXIT_CONFIG;
use clap::Args;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Report the next request without calling the API or writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let coordinator = match ExportCoordinator::new(config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(e.exit_code());
            }
        };

        match coordinator.run_step().await {
            Ok(summary) => {
                print_summary(&summary);
                Ok(summary.exit_code())
            }
            // Already logged by the coordinator
            Err(e) => {
                eprintln!("Export step failed [{}]: {e}", e.kind());
                Ok(e.exit_code())
            }
        }
    }
}

fn print_summary(summary: &StepSummary) {
    match &summary.outcome {
        StepOutcome::BatchCompleted(batch) => {
            println!(
                "Batch {} [{}, {}] complete: {} ({} bytes, {})",
                batch.index, batch.start, batch.end, batch.outcome, batch.bytes, batch.file_name
            );
            println!(
                "{} of {} batches complete, {} remaining ({:.2}s)",
                summary.completed_batches,
                summary.total_batches,
                summary.remaining_batches(),
                summary.duration.as_secs_f64()
            );
        }
        StepOutcome::NothingToDo => {
            println!(
                "All {} batches complete, nothing to do",
                summary.total_batches
            );
        }
        StepOutcome::DryRun(report) => {
            println!("DRY RUN - nothing was requested or written");
            match report.last_bib {
                Some(last_bib) => println!("  Last bib: {last_bib}"),
                None => println!("  Last bib: unresolved (would query the API)"),
            }
            if report.would_plan_batches {
                println!("  Batches: would be planned on this run");
            }
            match &report.next {
                Some(next) => println!(
                    "  Next request: batch {} id=[{},{}]",
                    next.index, next.start, next.request_end
                ),
                None if report.finished => println!("  Next request: none, all batches complete"),
                None => println!("  Next request: unknown until the last bib is resolved"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let args = ExportArgs { dry_run: false };
        let code = args
            .execute("/nonexistent/sierra-export.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
