//! Status command implementation

use crate::config::load_config;
use crate::core::export::{next_batch, NextBatch};
use crate::core::state::TrackerStore;
use crate::domain::errors::{EXIT_CONFIG, EXIT_PROGRESS};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// List every batch, not just the totals
    #[arg(long)]
    pub all: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(EXIT_CONFIG);
            }
        };

        let store = TrackerStore::new(&config.state.tracker_path);
        let tracker = match store.read() {
            Ok(Some(t)) => t,
            Ok(None) => {
                println!("No tracker at {}", store.path().display());
                println!("Run 'sierra-export export' to start.");
                return Ok(EXIT_PROGRESS);
            }
            Err(e) => {
                println!("Failed to read tracker");
                println!("   Error: {}", e);
                return Ok(e.exit_code());
            }
        };

        println!("Tracker: {}", store.path().display());
        println!("  Last updated: {}", tracker.last_updated);
        println!(
            "  Last bib: {}",
            tracker
                .last_bib
                .map(|b| b.to_string())
                .unwrap_or_else(|| "unresolved".to_string())
        );
        println!(
            "  Batches: {} total, {} complete, {} pending",
            tracker.batches.len(),
            tracker.completed_count(),
            tracker.pending_count()
        );

        match next_batch(&tracker) {
            NextBatch::Pending { index, batch } => {
                println!("  Next: batch {} [{}, {}]", index, batch.start, batch.end)
            }
            NextBatch::Done if tracker.is_finished() => println!("  Next: none, export finished"),
            NextBatch::Done => println!("  Next: batches not planned yet"),
        }

        if self.all && !tracker.batches.is_empty() {
            println!();
            println!(
                "{:<6} {:<10} {:<10} {:<8} {:<27} {}",
                "Index", "Start", "End", "Outcome", "Completed", "File"
            );
            println!("{}", "-".repeat(90));
            for (i, batch) in tracker.batches.iter().enumerate() {
                println!(
                    "{:<6} {:<10} {:<10} {:<8} {:<27} {}",
                    i,
                    batch.start.to_string(),
                    batch.end.to_string(),
                    batch
                        .outcome
                        .map(|o| o.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    batch
                        .last_grabbed
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "pending".to_string()),
                    batch.file_name.as_deref().unwrap_or("-")
                );
            }
        }

        Ok(EXIT_PROGRESS)
    }
}
