//! Domain error types
//!
//! This module defines the error hierarchy for sierra-export. Every fatal
//! condition of an export step maps onto one of these types so callers can
//! tell configuration problems, tracker problems and remote API refusals
//! apart. None of them expose third-party types.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code: the step completed a batch
pub const EXIT_PROGRESS: i32 = 0;
/// Exit code: configuration missing or invalid
pub const EXIT_CONFIG: i32 = 2;
/// Exit code: every batch is already complete
pub const EXIT_NOTHING_TO_DO: i32 = 3;
/// Exit code: the remote API refused or failed the step
pub const EXIT_REMOTE: i32 = 4;
/// Exit code: tracker/storage failure or any other fatal error
pub const EXIT_FATAL: i32 = 5;

/// Main sierra-export error type
#[derive(Debug, Error)]
pub enum SierraExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid planning range (end before start, zero chunks, too many chunks)
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Tracker document could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Tracker invariant violations
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// Sierra API errors
    #[error("Sierra API error: {0}")]
    Sierra(#[from] SierraError),

    /// File download or artifact write failed
    #[error("Download error: {0}")]
    Download(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SierraExportError {
    /// Short classification label used in the one-line failure log
    pub fn kind(&self) -> &'static str {
        match self {
            SierraExportError::Configuration(_) => "config_error",
            SierraExportError::InvalidRange(_) => "invalid_range",
            SierraExportError::Storage(_) => "storage_error",
            SierraExportError::Tracker(e) => e.kind(),
            SierraExportError::Sierra(e) => e.kind(),
            SierraExportError::Download(_) => "download_error",
            SierraExportError::Io(_) => "io_error",
            SierraExportError::Serialization(_) => "serialization_error",
        }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            SierraExportError::Configuration(_) | SierraExportError::InvalidRange(_) => {
                EXIT_CONFIG
            }
            SierraExportError::Sierra(_) | SierraExportError::Download(_) => EXIT_REMOTE,
            SierraExportError::Storage(_)
            | SierraExportError::Tracker(_)
            | SierraExportError::Io(_)
            | SierraExportError::Serialization(_) => EXIT_FATAL,
        }
    }
}

/// Tracker document storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The tracker exists but could not be read
    #[error("Tracker file {path} could not be read: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// The tracker exists but does not parse
    #[error("Tracker file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The tracker could not be written
    #[error("Tracker file {path} could not be written: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Another run holds the tracker lock
    #[error("Tracker is locked by another run ({path}): {holder}")]
    Locked { path: PathBuf, holder: String },
}

/// Tracker invariant violations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Batch index does not exist
    #[error("Batch index {index} out of range (tracker has {len} batches)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Batch was already marked complete
    #[error("Batch {index} was already completed at {completed_at}")]
    AlreadyComplete { index: usize, completed_at: String },

    /// The resolved upper bound is below the start of the ID space
    #[error("Last bib {last_bib} is below the ID space start {start}")]
    LastBibBelowStart { last_bib: u64, start: u64 },
}

impl TrackerError {
    fn kind(&self) -> &'static str {
        match self {
            TrackerError::IndexOutOfRange { .. } => "index_error",
            TrackerError::AlreadyComplete { .. } => "already_complete",
            TrackerError::LastBibBelowStart { .. } => "invalid_range",
        }
    }
}

/// Sierra API errors
///
/// Variants produced from a response carry the raw body so the failure log
/// has everything needed for diagnosis.
#[derive(Debug, Error)]
pub enum SierraError {
    /// Token request failed or returned an unusable body
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Range request refused by the API rate limiter
    #[error("Rate exceeded for endpoint: {body}")]
    RateLimited { body: String },

    /// The API accepted the request but its export job failed
    #[error("External process failed: {body}")]
    UpstreamProcessingFailed { body: String },

    /// Successful status with a body of no known shape
    #[error("Unrecognized range response: {body}")]
    UnrecognizedResponse { body: String },

    /// Status code outside the success range
    #[error("Unexpected status {status} from {endpoint}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Failed to reach the API
    #[error("Failed to connect to Sierra API: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response body could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl SierraError {
    fn kind(&self) -> &'static str {
        match self {
            SierraError::AuthenticationFailed(_) => "auth_error",
            SierraError::RateLimited { .. } => "rate_limited",
            SierraError::UpstreamProcessingFailed { .. } => "upstream_processing_failed",
            SierraError::UnrecognizedResponse { .. } => "unrecognized_response",
            SierraError::UnexpectedStatus { .. } => "unexpected_status",
            SierraError::ConnectionFailed(_) => "connection_failed",
            SierraError::Timeout(_) => "timeout",
            SierraError::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Map a transport error onto the matching variant
    pub fn from_transport(context: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            SierraError::Timeout(format!("{context}: {err}"))
        } else {
            SierraError::ConnectionFailed(format!("{context}: {err}"))
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SierraExportError {
    fn from(err: std::io::Error) -> Self {
        SierraExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SierraExportError {
    fn from(err: serde_json::Error) -> Self {
        SierraExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SierraExportError {
    fn from(err: toml::de::Error) -> Self {
        SierraExportError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SierraExportError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_sierra_error_conversion() {
        let sierra_err = SierraError::RateLimited {
            body: r#"{"name":"Rate exceeded for endpoint"}"#.to_string(),
        };
        let err: SierraExportError = sierra_err.into();
        assert!(matches!(err, SierraExportError::Sierra(_)));
        assert_eq!(err.kind(), "rate_limited");
        assert_eq!(err.exit_code(), EXIT_REMOTE);
    }

    #[test]
    fn test_tracker_error_kind_and_exit_code() {
        let err: SierraExportError = TrackerError::AlreadyComplete {
            index: 1,
            completed_at: "2024-01-01T00:00:00Z".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "already_complete");
        assert_eq!(err.exit_code(), EXIT_FATAL);

        let err: SierraExportError = TrackerError::IndexOutOfRange { index: 9, len: 2 }.into();
        assert_eq!(err.kind(), "index_error");
    }

    #[test]
    fn test_storage_error_message_contains_path() {
        let err = StorageError::Corrupt {
            path: PathBuf::from("/tmp/tracker.json"),
            reason: "expected value".to_string(),
        };
        assert!(err.to_string().contains("/tmp/tracker.json"));
    }

    #[test]
    fn test_configuration_exit_code() {
        assert_eq!(
            SierraExportError::Configuration("x".to_string()).exit_code(),
            EXIT_CONFIG
        );
        assert_eq!(
            SierraExportError::InvalidRange("x".to_string()).exit_code(),
            EXIT_CONFIG
        );
    }

    #[test]
    fn test_unexpected_status_carries_body() {
        let err = SierraError::UnexpectedStatus {
            endpoint: "bibs/marc".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SierraExportError = io_err.into();
        assert!(matches!(err, SierraExportError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SierraExportError = json_err.into();
        assert!(matches!(err, SierraExportError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SierraExportError = toml_err.into();
        assert!(matches!(err, SierraExportError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
