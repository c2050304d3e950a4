// Sierra Export - Resumable MARC batch exporter for the Sierra ILS
// Copyright (c) 2025 Sierra Export Contributors
// Licensed under the MIT License

//! # sierra-export - resumable MARC batch export
//!
//! Exports every bib record of a Sierra catalog as MARC files, one batch per
//! invocation. Progress lives in a small JSON tracker, so a scheduler can
//! re-run the binary until the whole ID space has been exported; any failure
//! leaves the current batch pending for the next run.
//!
//! ## Architecture
//!
//! - [`cli`] - command-line interface and argument parsing
//! - [`core`] - planning, selection, the export step, tracker, verification
//! - [`adapters`] - Sierra REST API client and artifact storage
//! - [`domain`] - record ids, errors, result alias
//! - [`config`] - configuration management
//! - [`logging`] - structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sierra_export::config::SierraExportConfig;
//! use sierra_export::core::export::ExportCoordinator;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SierraExportConfig::from_file("sierra-export.toml")?;
//!     let coordinator = ExportCoordinator::new(config)?;
//!
//!     let summary = coordinator.run_step().await?;
//!     std::process::exit(summary.exit_code());
//! }
//! ```
//!
//! ## Batch Planning
//!
//! ```rust
//! use sierra_export::core::export::planner::plan;
//! use sierra_export::domain::RangeId;
//!
//! let batches = plan(RangeId::new(1_000_000), RangeId::new(1_000_100), 2).unwrap();
//! assert_eq!(batches[1].end, RangeId::new(1_000_100));
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`]. Errors carry a
//! classification label and the exit code the binary reports:
//!
//! | Exit | Meaning |
//! |------|---------|
//! | 0 | a batch was completed |
//! | 2 | configuration error or invalid range |
//! | 3 | nothing left to do |
//! | 4 | Sierra API or download failure |
//! | 5 | tracker/storage or other fatal error |

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
