//! Artifact verification against the tracker

use super::checksum::checksum_file;
use super::report::{VerificationFailure, VerificationReport};
use crate::core::state::Tracker;
use std::path::Path;

/// Recompute the checksum of every completed batch's artifact
///
/// Batches that completed without a recorded checksum are skipped.
pub fn verify_artifacts(tracker: &Tracker, download_dir: &Path) -> VerificationReport {
    let mut report = VerificationReport::new();

    for (index, batch) in tracker.batches.iter().enumerate() {
        if !batch.is_complete() {
            continue;
        }

        let (Some(file_name), Some(expected)) = (&batch.file_name, &batch.sha256) else {
            report.record_skip();
            continue;
        };

        let failure = |actual: Option<String>, reason: String| VerificationFailure {
            batch_index: index,
            start: batch.start,
            end: batch.end,
            file_name: file_name.clone(),
            expected_checksum: expected.clone(),
            actual_checksum: actual,
            reason,
        };

        match checksum_file(&download_dir.join(file_name)) {
            Ok((_, actual)) if &actual == expected => report.record_pass(),
            Ok((_, actual)) => {
                tracing::warn!(batch_index = index, file = %file_name, "Checksum mismatch");
                report.record_failure(failure(Some(actual), "checksum mismatch".to_string()));
            }
            Err(e) => {
                tracing::warn!(batch_index = index, file = %file_name, error = %e, "Artifact unreadable");
                report.record_failure(failure(None, format!("cannot read artifact: {e}")));
            }
        }
    }

    tracing::info!(
        total = report.total_verified,
        passed = report.passed,
        failed = report.failed,
        skipped = report.skipped,
        "Artifact verification finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{Batch, BatchOutcome};
    use crate::core::verification::checksum::calculate_checksum_bytes;
    use crate::domain::RangeId;
    use chrono::Utc;

    fn completed(start: u64, file_name: &str, sha: Option<String>) -> Batch {
        let mut batch = Batch::new(RangeId::new(start), RangeId::new(start + 9));
        batch.last_grabbed = Some(Utc::now());
        batch.file_name = Some(file_name.to_string());
        batch.outcome = Some(BatchOutcome::File);
        batch.sha256 = sha;
        batch
    }

    #[test]
    fn test_verify_pass_fail_skip() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("good.mrc"), b"good").unwrap();
        std::fs::write(dir.path().join("bad.mrc"), b"tampered").unwrap();

        let mut tracker = Tracker::empty();
        tracker.batches = vec![
            completed(0, "good.mrc", Some(calculate_checksum_bytes(b"good"))),
            completed(10, "bad.mrc", Some(calculate_checksum_bytes(b"original"))),
            completed(20, "gone.mrc", Some(calculate_checksum_bytes(b"gone"))),
            completed(30, "legacy.mrc", None),
            Batch::new(RangeId::new(40), RangeId::new(49)),
        ];

        let report = verify_artifacts(&tracker, dir.path());
        assert_eq!(report.total_verified, 4);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failures[0].batch_index, 1);
        assert!(report.failures[0].actual_checksum.is_some());
        assert_eq!(report.failures[1].batch_index, 2);
        assert!(report.failures[1].actual_checksum.is_none());
    }
}
