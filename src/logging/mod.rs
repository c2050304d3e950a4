//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output filtered by level or `RUST_LOG`
//! - optional JSON log files with rotation
//! - one-line macros for the lifecycle of an export step
//!
//! # Example
//!
//! ```no_run
//! use sierra_export::logging::init_logging;
//! use sierra_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a batch
///
/// # Example
///
/// ```no_run
/// use sierra_export::log_batch_start;
/// use sierra_export::core::state::Batch;
/// use sierra_export::domain::RangeId;
///
/// let batch = Batch::new(RangeId::new(1_000_000), RangeId::new(1_000_049));
/// log_batch_start!(0, &batch, 100);
/// ```
#[macro_export]
macro_rules! log_batch_start {
    ($index:expr, $batch:expr, $total:expr) => {
        tracing::info!(
            batch_index = $index,
            total_batches = $total,
            chunk_start_bib = %$batch.start,
            chunk_end_bib = %$batch.end,
            "Starting batch"
        );
    };
}

/// Log a batch reaching a terminal outcome
///
/// # Example
///
/// ```no_run
/// use sierra_export::log_batch_complete;
/// use sierra_export::core::state::{Batch, BatchOutcome};
/// use sierra_export::domain::RangeId;
/// use std::time::Duration;
///
/// let batch = Batch::new(RangeId::new(1_000_000), RangeId::new(1_000_049));
/// log_batch_complete!(0, &batch, BatchOutcome::File, 4096, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_batch_complete {
    ($index:expr, $batch:expr, $outcome:expr, $bytes:expr, $duration:expr) => {
        tracing::info!(
            batch_index = $index,
            chunk_start_bib = %$batch.start,
            chunk_end_bib = %$batch.end,
            outcome = %$outcome,
            bytes = $bytes,
            duration_ms = $duration.as_millis() as u64,
            "Batch complete"
        );
    };
}

/// Log the single classification line for an aborted step
///
/// The error's `Display` carries the raw response body where there is one.
///
/// # Example
///
/// ```no_run
/// use sierra_export::log_step_aborted;
/// use sierra_export::domain::{SierraError, SierraExportError};
///
/// let error: SierraExportError = SierraError::RateLimited { body: "{}".into() }.into();
/// log_step_aborted!(&error, Some(3usize));
/// ```
#[macro_export]
macro_rules! log_step_aborted {
    ($error:expr, $index:expr) => {
        tracing::error!(
            kind = $error.kind(),
            exit_code = $error.exit_code(),
            batch_index = ?$index,
            error = %$error,
            "Export step aborted"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::core::state::{Batch, BatchOutcome};
    use crate::domain::{RangeId, SierraExportError};
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let batch = Batch::new(RangeId::new(10), RangeId::new(20));
        log_batch_start!(0usize, &batch, 4usize);
        log_batch_complete!(0usize, &batch, BatchOutcome::Empty, 19u64, Duration::from_millis(5));
        let error = SierraExportError::Download("status 404".to_string());
        log_step_aborted!(&error, Some(0usize));
    }
}
