//! Verify command implementation

use crate::config::load_config;
use crate::core::state::TrackerStore;
use crate::core::verification::verify_artifacts;
use crate::domain::errors::{EXIT_CONFIG, EXIT_FATAL, EXIT_PROGRESS};
use clap::Args;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Maximum number of failures to print
    #[arg(long, default_value_t = 10)]
    pub max_failures: usize,
}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = TrackerStore::new(&config.state.tracker_path);
        let tracker = match store.read() {
            Ok(Some(t)) => t,
            Ok(None) => {
                println!("No tracker at {}, nothing to verify", store.path().display());
                return Ok(EXIT_PROGRESS);
            }
            Err(e) => {
                println!("Failed to read tracker");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let report = verify_artifacts(&tracker, &config.export.download_dir);
        report.log_summary();

        println!("Verification Results:");
        println!("  Total Verified: {}", report.total_verified);
        println!("  Passed: {}", report.passed);
        println!("  Failed: {}", report.failed);
        println!("  Skipped: {}", report.skipped);

        if !report.failures.is_empty() {
            println!();
            println!("  Failures:");
            for failure in report.failures.iter().take(self.max_failures) {
                println!(
                    "    - batch {} [{}, {}] {}",
                    failure.batch_index, failure.start, failure.end, failure.file_name
                );
                println!("      Reason: {}", failure.reason);
            }
            if report.failures.len() > self.max_failures {
                println!(
                    "    ... and {} more failures",
                    report.failures.len() - self.max_failures
                );
            }
        }

        Ok(if report.is_success() {
            EXIT_PROGRESS
        } else {
            EXIT_FATAL
        })
    }
}
