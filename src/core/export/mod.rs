//! Export planning and orchestration
//!
//! - [`planner`] splits the ID space into batches
//! - [`selector`] picks the next pending batch
//! - [`coordinator`] runs one export step
//! - [`summary`] reports what the step did

pub mod coordinator;
pub mod planner;
pub mod selector;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use selector::{next_batch, NextBatch};
pub use summary::{CompletedBatch, DryRunReport, PlannedRequest, StepOutcome, StepSummary};
