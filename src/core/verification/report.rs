//! Verification report structures

use crate::domain::RangeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of re-checking the artifacts recorded in the tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Completed batches examined
    pub total_verified: usize,

    /// Artifacts present with the recorded checksum
    pub passed: usize,

    /// Missing or mismatched artifacts
    pub failed: usize,

    /// Completed batches without a recorded checksum (e.g. written by an older tool)
    pub skipped: usize,

    /// Details of every failure
    pub failures: Vec<VerificationFailure>,
}

/// One artifact that did not verify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub batch_index: usize,
    pub start: RangeId,
    pub end: RangeId,
    pub file_name: String,
    pub expected_checksum: String,
    /// `None` when the file could not be read
    pub actual_checksum: Option<String>,
    pub reason: String,
}

impl VerificationReport {
    pub fn new() -> Self {
        Self {
            verified_at: Utc::now(),
            total_verified: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_pass(&mut self) {
        self.total_verified += 1;
        self.passed += 1;
    }

    pub fn record_failure(&mut self, failure: VerificationFailure) {
        self.total_verified += 1;
        self.failed += 1;
        self.failures.push(failure);
    }

    pub fn record_skip(&mut self) {
        self.total_verified += 1;
        self.skipped += 1;
    }

    /// Check if all verifications passed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn log_summary(&self) {
        if self.is_success() {
            tracing::info!(
                total = self.total_verified,
                passed = self.passed,
                skipped = self.skipped,
                "Artifact verification passed"
            );
        } else {
            for failure in &self.failures {
                tracing::warn!(
                    batch_index = failure.batch_index,
                    file_name = %failure.file_name,
                    expected = %failure.expected_checksum,
                    actual = ?failure.actual_checksum,
                    reason = %failure.reason,
                    "Artifact verification failed"
                );
            }
            tracing::error!(
                total = self.total_verified,
                failed = self.failed,
                "Artifact verification found failures"
            );
        }
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = VerificationReport::new();
        report.record_pass();
        report.record_skip();
        assert!(report.is_success());

        report.record_failure(VerificationFailure {
            batch_index: 2,
            start: RangeId::new(1),
            end: RangeId::new(9),
            file_name: "x.mrc".to_string(),
            expected_checksum: "abc".to_string(),
            actual_checksum: None,
            reason: "missing".to_string(),
        });

        assert_eq!(report.total_verified, 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.is_success());
    }
}
