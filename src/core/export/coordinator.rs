//! Export coordinator - one export step per invocation
//!
//! A step loads the tracker, resolves the ID-space upper bound once, plans
//! batches once, then takes the first pending batch through
//! request -> (download | save empty response) -> mark complete.
//!
//! Any failure aborts the step before `mark_complete`, so the batch stays
//! pending and the next invocation retries it. Network calls are strictly
//! sequential and the token is fetched at most once per step.

use crate::adapters::filesystem::{ArtifactStore, StoredArtifact};
use crate::adapters::sierra::{AccessToken, CatalogApi, RangeOutcome, SierraClient};
use crate::config::SierraExportConfig;
use crate::core::export::planner;
use crate::core::export::selector::{next_batch, NextBatch};
use crate::core::export::summary::{
    CompletedBatch, DryRunReport, PlannedRequest, StepOutcome, StepSummary,
};
use crate::core::state::{Batch, BatchOutcome, CompletionRecord, Tracker, TrackerStore};
use crate::domain::{RangeId, Result, TrackerError};
use crate::{log_batch_complete, log_batch_start, log_step_aborted};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Export coordinator
pub struct ExportCoordinator {
    config: SierraExportConfig,
    api: Arc<dyn CatalogApi>,
    store: TrackerStore,
    artifacts: ArtifactStore,
}

impl ExportCoordinator {
    /// Create a coordinator talking to the configured Sierra API
    pub fn new(config: SierraExportConfig) -> Result<Self> {
        let api = Arc::new(SierraClient::new(
            &config.sierra,
            config.export.latest_lookback_days,
        )?);
        let store = TrackerStore::new(&config.state.tracker_path)
            .with_lock_stale_after(Duration::from_secs(config.state.lock_stale_after_seconds));
        let artifacts =
            ArtifactStore::new(&config.export.download_dir, &config.export.file_prefix);
        Ok(Self::with_components(config, api, store, artifacts))
    }

    /// Create a coordinator from explicit parts
    pub fn with_components(
        config: SierraExportConfig,
        api: Arc<dyn CatalogApi>,
        store: TrackerStore,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            config,
            api,
            store,
            artifacts,
        }
    }

    /// Tracker store used by every step
    pub fn store(&self) -> &TrackerStore {
        &self.store
    }

    /// Run one export step
    ///
    /// Returns the summary for progress and nothing-to-do; every fatal
    /// condition is returned as an error after one `Export step aborted` log
    /// line.
    pub async fn run_step(&self) -> Result<StepSummary> {
        let started = Instant::now();

        if self.config.application.dry_run {
            return self.dry_run().map(|s| s.with_duration(started.elapsed()));
        }

        let mut current_index = None;
        match self.step(&mut current_index).await {
            Ok(summary) => {
                let summary = summary.with_duration(started.elapsed());
                summary.log_summary();
                Ok(summary)
            }
            Err(e) => {
                log_step_aborted!(&e, current_index);
                Err(e)
            }
        }
    }

    async fn step(&self, current_index: &mut Option<usize>) -> Result<StepSummary> {
        let _lock = self.store.acquire_lock()?;
        let mut tracker = self.store.load()?;

        if tracker.is_finished() {
            return Ok(StepSummary::new(
                StepOutcome::NothingToDo,
                tracker.completed_count(),
                tracker.batches.len(),
            ));
        }

        let mut token: Option<AccessToken> = None;
        let start = self.id_space_start();
        let last_bib = self.resolve_last_bib(&mut tracker, &mut token).await?;

        if last_bib < start {
            return Err(TrackerError::LastBibBelowStart {
                last_bib: last_bib.value(),
                start: start.value(),
            }
            .into());
        }

        self.store
            .ensure_batches(&mut tracker, start, last_bib, self.config.export.chunk_count)?;

        let (index, batch) = match next_batch(&tracker) {
            NextBatch::Pending { index, batch } => (index, batch.clone()),
            NextBatch::Done => {
                return Ok(StepSummary::new(
                    StepOutcome::NothingToDo,
                    tracker.completed_count(),
                    tracker.batches.len(),
                ))
            }
        };
        *current_index = Some(index);

        let token = match token {
            Some(token) => token,
            None => self.api.authenticate().await?,
        };

        let batch_started = Instant::now();
        log_batch_start!(index, &batch, tracker.batches.len());

        let (outcome, artifact) = self.process_batch(&token, &batch).await?;

        let record = CompletionRecord {
            file_name: artifact.file_name.clone(),
            outcome,
            bytes: artifact.bytes,
            sha256: artifact.sha256.clone(),
        };
        self.store.mark_complete(&mut tracker, index, record)?;

        log_batch_complete!(index, &batch, outcome, artifact.bytes, batch_started.elapsed());

        Ok(StepSummary::new(
            StepOutcome::BatchCompleted(CompletedBatch {
                index,
                start: batch.start,
                end: batch.end,
                outcome,
                file_name: artifact.file_name,
                bytes: artifact.bytes,
                sha256: artifact.sha256,
            }),
            tracker.completed_count(),
            tracker.batches.len(),
        ))
    }

    /// Upper bound from the tracker, else the configuration, else the API
    async fn resolve_last_bib(
        &self,
        tracker: &mut Tracker,
        token: &mut Option<AccessToken>,
    ) -> Result<RangeId> {
        if let (Some(stored), Some(configured)) = (tracker.last_bib, self.configured_end()) {
            if stored != configured {
                tracing::warn!(
                    stored = %stored,
                    configured = %configured,
                    "Tracker last bib differs from export.id_space_end; keeping the tracker value"
                );
            }
        }

        let configured = self.configured_end();
        let api = Arc::clone(&self.api);
        self.store
            .resolve_last_bib(tracker, || async move {
                if let Some(end) = configured {
                    return Ok(end);
                }
                let fresh = api.authenticate().await?;
                let latest = api.latest_record_id(&fresh).await?;
                *token = Some(fresh);
                Ok(latest)
            })
            .await
    }

    /// Request the batch's range and store whatever it produced
    async fn process_batch(
        &self,
        token: &AccessToken,
        batch: &Batch,
    ) -> Result<(BatchOutcome, StoredArtifact)> {
        let request_end = self.request_end(batch);
        if request_end != batch.end {
            tracing::debug!(
                planned_end = %batch.end,
                request_end = %request_end,
                "Request span override in effect"
            );
        }

        let outcome = self
            .api
            .request_range(token, batch.start, request_end)
            .await?
            .into_outcome()?;

        match outcome {
            RangeOutcome::FileReady(url) => {
                let name = self.artifacts.marc_file_name(batch.start, batch.end);
                let mut part = self.artifacts.begin(&name).await?;
                self.api.download(token, &url, &mut part).await?;
                let artifact = part.commit().await?;
                Ok((BatchOutcome::File, artifact))
            }
            RangeOutcome::EmptyRange(body) => {
                tracing::info!(
                    chunk_start_bib = %batch.start,
                    chunk_end_bib = %batch.end,
                    "No records in range, saving response"
                );
                let name = self.artifacts.empty_file_name(batch.start, batch.end);
                let artifact = self.artifacts.write_all(&name, &body).await?;
                Ok((BatchOutcome::Empty, artifact))
            }
        }
    }

    /// Report the next request without touching the tracker or the network
    fn dry_run(&self) -> Result<StepSummary> {
        let tracker = self.store.read()?.unwrap_or_default();
        let start = self.id_space_start();
        let last_bib = tracker.last_bib.or(self.configured_end());
        let would_plan_batches = tracker.batches.is_empty();

        let planned = match (would_plan_batches, last_bib) {
            (false, _) => tracker.clone(),
            (true, Some(end)) => Tracker {
                batches: planner::plan(start, end, self.config.export.chunk_count)?,
                ..tracker.clone()
            },
            (true, None) => tracker.clone(),
        };

        let next = match next_batch(&planned) {
            NextBatch::Pending { index, batch } => Some(PlannedRequest {
                index,
                start: batch.start,
                end: batch.end,
                request_end: self.request_end(batch),
            }),
            NextBatch::Done => None,
        };

        let report = DryRunReport {
            last_bib,
            would_resolve_last_bib: last_bib.is_none(),
            would_plan_batches,
            next,
            finished: tracker.is_finished(),
        };

        let summary = StepSummary::new(
            StepOutcome::DryRun(report),
            planned.completed_count(),
            planned.batches.len(),
        );
        summary.log_summary();
        Ok(summary)
    }

    fn id_space_start(&self) -> RangeId {
        RangeId::new(self.config.export.id_space_start)
    }

    fn configured_end(&self) -> Option<RangeId> {
        self.config.export.id_space_end.map(RangeId::new)
    }

    fn request_end(&self, batch: &Batch) -> RangeId {
        self.config
            .export
            .request_span_override
            .map(|span| batch.start.offset(span))
            .unwrap_or(batch.end)
    }
}
