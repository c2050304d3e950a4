//! Tracker persistence
//!
//! [`TrackerStore`] owns the tracker file. Every mutation goes through a
//! load -> mutate a copy -> persist -> commit discipline: the in-memory
//! tracker only changes once the new document is safely on disk, so a failed
//! write never leaves memory and disk disagreeing.
//!
//! Writes are atomic (temp file, fsync, rename). A single-run lock file next
//! to the tracker keeps two overlapping invocations from racing on the
//! read-modify-write cycle.

use crate::core::export::planner;
use crate::core::state::tracker::{CompletionRecord, Tracker};
use crate::domain::{RangeId, Result, StorageError, TrackerError};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::future::Future;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// File-backed tracker store
#[derive(Debug, Clone)]
pub struct TrackerStore {
    path: PathBuf,
    lock_stale_after: Duration,
}

impl TrackerStore {
    /// Create a store for the tracker at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_stale_after: Duration::from_secs(6 * 60 * 60),
        }
    }

    /// Set the age after which an existing lock file is treated as abandoned
    pub fn with_lock_stale_after(mut self, stale_after: Duration) -> Self {
        self.lock_stale_after = stale_after;
        self
    }

    /// Path of the tracker document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the single-run lock file
    pub fn lock_path(&self) -> PathBuf {
        sibling(&self.path, "lock")
    }

    /// Load the tracker, creating and persisting an empty one if absent
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unreadable`] or [`StorageError::Corrupt`] when
    /// a tracker exists but cannot be used. The existing file is never
    /// replaced in that case.
    pub fn load(&self) -> Result<Tracker> {
        match self.read()? {
            Some(tracker) => Ok(tracker),
            None => {
                tracing::info!(path = %self.path.display(), "No tracker found, creating one");
                let mut tracker = Tracker::empty();
                self.persist(&mut tracker)?;
                Ok(tracker)
            }
        }
    }

    /// Read the tracker without creating it
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn read(&self) -> Result<Option<Tracker>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::Unreadable {
                    path: self.path.clone(),
                    reason: e.to_string(),
                }
                .into())
            }
        };

        let tracker = serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(tracker))
    }

    /// Resolve and freeze the ID-space upper bound
    ///
    /// Calls `fetch_latest` only when `last_bib` is unset; otherwise returns
    /// the stored value untouched.
    pub async fn resolve_last_bib<F, Fut>(
        &self,
        tracker: &mut Tracker,
        fetch_latest: F,
    ) -> Result<RangeId>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RangeId>>,
    {
        if let Some(last_bib) = tracker.last_bib {
            tracing::debug!(last_bib = %last_bib, "Last bib already resolved");
            return Ok(last_bib);
        }

        let last_bib = fetch_latest().await?;
        let mut updated = tracker.clone();
        updated.last_bib = Some(last_bib);
        self.commit(tracker, updated)?;

        tracing::info!(last_bib = %last_bib, "Resolved last bib");
        Ok(last_bib)
    }

    /// Plan batches over `[start, end]` if none exist yet
    ///
    /// Returns `true` when batches were planned by this call.
    pub fn ensure_batches(
        &self,
        tracker: &mut Tracker,
        start: RangeId,
        end: RangeId,
        n: usize,
    ) -> Result<bool> {
        if !tracker.batches.is_empty() {
            return Ok(false);
        }

        let mut updated = tracker.clone();
        updated.batches = planner::plan(start, end, n)?;
        self.commit(tracker, updated)?;

        tracing::info!(
            start = %start,
            end = %end,
            batches = n,
            "Planned export batches"
        );
        Ok(true)
    }

    /// Mark batch `index` complete and persist
    ///
    /// # Errors
    ///
    /// [`TrackerError::IndexOutOfRange`] for an unknown index and
    /// [`TrackerError::AlreadyComplete`] if the batch was completed before.
    pub fn mark_complete(
        &self,
        tracker: &mut Tracker,
        index: usize,
        record: CompletionRecord,
    ) -> Result<()> {
        let len = tracker.batches.len();
        let batch = tracker
            .batches
            .get(index)
            .ok_or(TrackerError::IndexOutOfRange { index, len })?;

        if let Some(completed_at) = batch.last_grabbed {
            return Err(TrackerError::AlreadyComplete {
                index,
                completed_at: completed_at.to_rfc3339(),
            }
            .into());
        }

        let mut updated = tracker.clone();
        let batch = &mut updated.batches[index];
        batch.last_grabbed = Some(Utc::now());
        batch.file_name = Some(record.file_name);
        batch.outcome = Some(record.outcome);
        batch.bytes = Some(record.bytes);
        batch.sha256 = Some(record.sha256);
        self.commit(tracker, updated)
    }

    /// Acquire the single-run lock
    ///
    /// # Errors
    ///
    /// [`StorageError::Locked`] when a live lock is held by another run.
    pub fn acquire_lock(&self) -> Result<TrackerLock> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_failed(e))?;
        }

        match self.try_create_lock(&lock_path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(&lock_path).unwrap_or_default();
                if self.lock_is_stale(&lock_path) {
                    tracing::warn!(
                        lock = %lock_path.display(),
                        holder = %holder.trim(),
                        "Taking over stale tracker lock"
                    );
                    fs::remove_file(&lock_path).map_err(|e| self.write_failed(e))?;
                    return self
                        .try_create_lock(&lock_path)
                        .map_err(|e| self.write_failed(e));
                }
                Err(StorageError::Locked {
                    path: lock_path,
                    holder: holder.trim().to_string(),
                }
                .into())
            }
            Err(e) => Err(self.write_failed(e)),
        }
    }

    fn try_create_lock(&self, lock_path: &Path) -> std::io::Result<TrackerLock> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(lock_path)?;
        writeln!(
            file,
            "pid={} acquired_at={}",
            std::process::id(),
            Utc::now().to_rfc3339()
        )?;
        file.sync_all()?;
        Ok(TrackerLock {
            path: lock_path.to_path_buf(),
        })
    }

    fn lock_is_stale(&self, lock_path: &Path) -> bool {
        fs::metadata(lock_path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age > self.lock_stale_after)
    }

    /// Persist `updated`, then make it the live tracker
    fn commit(&self, tracker: &mut Tracker, mut updated: Tracker) -> Result<()> {
        self.persist(&mut updated)?;
        *tracker = updated;
        Ok(())
    }

    /// Full-document atomic overwrite
    fn persist(&self, tracker: &mut Tracker) -> Result<()> {
        tracker.last_updated = Utc::now().to_rfc3339();
        let bytes = serde_json::to_vec_pretty(tracker)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_failed(e))?;
        }

        let tmp = sibling(&self.path, "tmp");
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            self.write_failed(e)
        })?;

        tracing::debug!(
            path = %self.path.display(),
            batches = tracker.batches.len(),
            "Tracker persisted"
        );
        Ok(())
    }

    fn write_failed(&self, e: std::io::Error) -> crate::domain::SierraExportError {
        StorageError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        }
        .into()
    }
}

/// Held for the duration of one export step; removes the lock file on drop
#[derive(Debug)]
pub struct TrackerLock {
    path: PathBuf,
}

impl TrackerLock {
    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TrackerLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "Failed to remove tracker lock");
        }
    }
}

/// `tracker.json` -> `tracker.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
