//! Tracker document model
//!
//! The tracker is the single persisted progress document: the resolved upper
//! bound of the ID space, the planned batches, and a completion cursor per
//! batch. The JSON layout is stable; fields added later are optional, and
//! fields this version does not know about are carried through rewrites.

use crate::domain::ids::{as_string_opt, RangeId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// How a batch reached completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    /// A MARC file was produced and downloaded
    File,
    /// The API reported no records in the range; its response body was saved
    Empty,
}

impl std::fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchOutcome::File => write!(f, "file"),
            BatchOutcome::Empty => write!(f, "empty"),
        }
    }
}

/// One contiguous, inclusive sub-range of the record-ID space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// First record id of the batch (inclusive)
    #[serde(rename = "chunk_start_bib")]
    pub start: RangeId,

    /// Last record id of the batch (inclusive)
    #[serde(rename = "chunk_end_bib")]
    pub end: RangeId,

    /// Completion marker; `None` means pending
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub last_grabbed: Option<DateTime<Utc>>,

    /// Artifact written for this batch, relative to the download directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Terminal classification of the batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<BatchOutcome>,

    /// Size of the artifact in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,

    /// Hex SHA-256 of the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Fields written by other versions of the tool
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Batch {
    /// Create a pending batch covering `[start, end]`
    pub fn new(start: RangeId, end: RangeId) -> Self {
        Self {
            start,
            end,
            last_grabbed: None,
            file_name: None,
            outcome: None,
            bytes: None,
            sha256: None,
            extra: BTreeMap::new(),
        }
    }

    /// Whether the batch has been completed
    pub fn is_complete(&self) -> bool {
        self.last_grabbed.is_some()
    }

    /// Number of record ids covered by the batch
    pub fn len(&self) -> u64 {
        self.start
            .distance_to(self.end)
            .map(|d| d.saturating_add(1))
            .unwrap_or(0)
    }

    /// Whether the batch covers no ids (only possible with a malformed document)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything recorded about a batch when it completes
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    pub file_name: String,
    pub outcome: BatchOutcome,
    pub bytes: u64,
    pub sha256: String,
}

/// The persisted progress document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    /// When the document was last written; informational only
    #[serde(default)]
    pub last_updated: String,

    /// Upper bound of the exportable ID space, frozen once resolved
    #[serde(default, with = "as_string_opt")]
    pub last_bib: Option<RangeId>,

    /// Planned batches in processing order
    #[serde(default)]
    pub batches: Vec<Batch>,

    /// Fields written by other versions of the tool
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Tracker {
    /// A fresh tracker with nothing resolved and nothing planned
    pub fn empty() -> Self {
        Self {
            last_updated: Utc::now().to_rfc3339(),
            last_bib: None,
            batches: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Number of completed batches
    pub fn completed_count(&self) -> usize {
        self.batches.iter().filter(|b| b.is_complete()).count()
    }

    /// Number of pending batches
    pub fn pending_count(&self) -> usize {
        self.batches.len() - self.completed_count()
    }

    /// Whether batches have been planned and every one is complete
    pub fn is_finished(&self) -> bool {
        !self.batches.is_empty() && self.pending_count() == 0
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::empty()
    }
}

/// Accepts RFC 3339 and the legacy `YYYY-MM-DD HH:MM:SS[.ffffff]` form.
fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{s}'"))),
    }
}

/// Parse a tracker timestamp in any of the accepted forms
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_json_layout() {
        let batch = Batch::new(RangeId::new(1_000_000), RangeId::new(1_000_049));
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["chunk_start_bib"], 1_000_000);
        assert_eq!(json["chunk_end_bib"], 1_000_049);
        assert!(json["last_grabbed"].is_null());
        assert!(json.get("sha256").is_none());
    }

    #[test]
    fn test_tracker_json_layout() {
        let mut tracker = Tracker::empty();
        tracker.last_bib = Some(RangeId::new(3_500_000));
        let json = serde_json::to_value(&tracker).unwrap();
        assert_eq!(json["last_bib"], "3500000");
        assert!(json["batches"].as_array().unwrap().is_empty());
        assert!(json["last_updated"].is_string());
    }

    #[test]
    fn test_legacy_document_reads() {
        let legacy = r#"{
            "last_updated": "2018-03-01 10:11:12.123456",
            "last_bib": "1000500",
            "batches": [
                {"chunk_start_bib": 1000000, "chunk_end_bib": 1000250,
                 "last_grabbed": "2018-03-01 10:11:12.123456", "file_name": "a.mrc"},
                {"chunk_start_bib": 1000250, "chunk_end_bib": 1000500, "last_grabbed": null}
            ]
        }"#;
        let tracker: Tracker = serde_json::from_str(legacy).unwrap();
        assert_eq!(tracker.last_bib, Some(RangeId::new(1_000_500)));
        assert!(tracker.batches[0].is_complete());
        assert!(!tracker.batches[1].is_complete());
        assert_eq!(tracker.batches[0].file_name.as_deref(), Some("a.mrc"));
        assert_eq!(tracker.completed_count(), 1);
        assert_eq!(tracker.pending_count(), 1);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let doc = r#"{
            "last_updated": "x",
            "last_bib": null,
            "batches": [{"chunk_start_bib": 1, "chunk_end_bib": 2, "last_grabbed": null, "note": "keep"}],
            "operator": "nightly-cron"
        }"#;
        let tracker: Tracker = serde_json::from_str(doc).unwrap();
        let json = serde_json::to_value(&tracker).unwrap();
        assert_eq!(json["operator"], "nightly-cron");
        assert_eq!(json["batches"][0]["note"], "keep");
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp("2024-05-01T12:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T12:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01 12:00:00").is_some());
        assert!(parse_timestamp("2024-05-01 12:00:00.5").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_batch_len() {
        let batch = Batch::new(RangeId::new(10), RangeId::new(19));
        assert_eq!(batch.len(), 10);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_is_finished() {
        let mut tracker = Tracker::empty();
        assert!(!tracker.is_finished());

        tracker.batches.push(Batch::new(RangeId::new(1), RangeId::new(5)));
        assert!(!tracker.is_finished());

        tracker.batches[0].last_grabbed = Some(Utc::now());
        assert!(tracker.is_finished());
    }
}
