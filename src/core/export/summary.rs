//! Export step summary and reporting

use crate::core::state::BatchOutcome;
use crate::domain::errors::{EXIT_NOTHING_TO_DO, EXIT_PROGRESS};
use crate::domain::RangeId;
use std::time::Duration;

/// A batch that reached a terminal outcome in this step
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedBatch {
    pub index: usize,
    pub start: RangeId,
    pub end: RangeId,
    pub outcome: BatchOutcome,
    pub file_name: String,
    pub bytes: u64,
    pub sha256: String,
}

/// The request a real step would issue next
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRequest {
    pub index: usize,
    pub start: RangeId,
    pub end: RangeId,
    /// Upper bound actually sent; differs from `end` with a request span override
    pub request_end: RangeId,
}

/// What a dry run found, without changing anything
#[derive(Debug, Clone, PartialEq)]
pub struct DryRunReport {
    /// Upper bound from the tracker or the configuration, if known
    pub last_bib: Option<RangeId>,
    /// Whether a real step would have to query the API for the upper bound
    pub would_resolve_last_bib: bool,
    /// Whether a real step would plan batches first
    pub would_plan_batches: bool,
    pub next: Option<PlannedRequest>,
    /// Whether every planned batch is already complete
    pub finished: bool,
}

/// Result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// One batch was completed and recorded
    BatchCompleted(CompletedBatch),
    /// All batches were already complete; no network calls were made
    NothingToDo,
    /// Dry run; nothing was requested or written
    DryRun(DryRunReport),
}

/// Summary of one export step
#[derive(Debug, Clone)]
pub struct StepSummary {
    pub outcome: StepOutcome,
    pub completed_batches: usize,
    pub total_batches: usize,
    pub duration: Duration,
}

impl StepSummary {
    pub fn new(outcome: StepOutcome, completed_batches: usize, total_batches: usize) -> Self {
        Self {
            outcome,
            completed_batches,
            total_batches,
            duration: Duration::from_secs(0),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Process exit code: progress, or nothing left to do
    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            StepOutcome::BatchCompleted(_) => EXIT_PROGRESS,
            StepOutcome::NothingToDo => EXIT_NOTHING_TO_DO,
            StepOutcome::DryRun(report) if report.finished => EXIT_NOTHING_TO_DO,
            StepOutcome::DryRun(_) => EXIT_PROGRESS,
        }
    }

    /// Batches still pending after this step
    pub fn remaining_batches(&self) -> usize {
        self.total_batches.saturating_sub(self.completed_batches)
    }

    /// Log the summary
    pub fn log_summary(&self) {
        match &self.outcome {
            StepOutcome::BatchCompleted(batch) => tracing::info!(
                batch_index = batch.index,
                outcome = %batch.outcome,
                file_name = %batch.file_name,
                completed = self.completed_batches,
                total = self.total_batches,
                remaining = self.remaining_batches(),
                duration_ms = self.duration.as_millis() as u64,
                "Export step made progress"
            ),
            StepOutcome::NothingToDo => tracing::info!(
                total = self.total_batches,
                "All batches complete, nothing to do"
            ),
            StepOutcome::DryRun(report) => tracing::info!(
                last_bib = ?report.last_bib,
                would_resolve_last_bib = report.would_resolve_last_bib,
                would_plan_batches = report.would_plan_batches,
                next = ?report.next,
                "Dry run"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed() -> CompletedBatch {
        CompletedBatch {
            index: 0,
            start: RangeId::new(1),
            end: RangeId::new(10),
            outcome: BatchOutcome::File,
            file_name: "f.mrc".to_string(),
            bytes: 3,
            sha256: "abc".to_string(),
        }
    }

    fn dry_run(finished: bool) -> DryRunReport {
        DryRunReport {
            last_bib: Some(RangeId::new(10)),
            would_resolve_last_bib: false,
            would_plan_batches: false,
            next: None,
            finished,
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            StepSummary::new(StepOutcome::BatchCompleted(completed()), 1, 2).exit_code(),
            EXIT_PROGRESS
        );
        assert_eq!(
            StepSummary::new(StepOutcome::NothingToDo, 2, 2).exit_code(),
            EXIT_NOTHING_TO_DO
        );
        assert_eq!(
            StepSummary::new(StepOutcome::DryRun(dry_run(true)), 2, 2).exit_code(),
            EXIT_NOTHING_TO_DO
        );
        assert_eq!(
            StepSummary::new(StepOutcome::DryRun(dry_run(false)), 1, 2).exit_code(),
            EXIT_PROGRESS
        );
    }

    #[test]
    fn test_remaining_batches() {
        let summary = StepSummary::new(StepOutcome::NothingToDo, 3, 5)
            .with_duration(Duration::from_millis(20));
        assert_eq!(summary.remaining_batches(), 2);
        assert_eq!(summary.duration, Duration::from_millis(20));
    }
}
