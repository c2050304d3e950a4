//! Core export logic for sierra-export.
//!
//! # Modules
//!
//! - [`export`] - batch planning, next-batch selection and the export step
//! - [`state`] - the tracker document and its persistence
//! - [`verification`] - artifact checksums
//!
//! # Export Step
//!
//! Each invocation performs at most one batch:
//!
//! 1. **Load**: read the tracker under the single-run lock, creating it if absent
//! 2. **Resolve**: fix the ID-space upper bound once (configuration or API)
//! 3. **Plan**: split `[id_space_start, last_bib]` into batches once
//! 4. **Select**: pick the first pending batch
//! 5. **Export**: request the range; download the file or keep the empty response
//! 6. **Record**: mark the batch complete and persist
//!
//! # Example
//!
//! ```rust,no_run
//! use sierra_export::config::load_config;
//! use sierra_export::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sierra-export.toml")?;
//! let coordinator = ExportCoordinator::new(config)?;
//!
//! let summary = coordinator.run_step().await?;
//! println!("{} of {} batches complete", summary.completed_batches, summary.total_batches);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod state;
pub mod verification;
