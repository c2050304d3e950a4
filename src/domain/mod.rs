//! Domain types for sierra-export.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Record identifiers** ([`RangeId`])
//! - **Error types** ([`SierraExportError`], [`StorageError`], [`TrackerError`], [`SierraError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SierraExportError>`]. Each error
//! knows its classification label and the process exit code it maps to:
//!
//! ```rust
//! use sierra_export::domain::{SierraError, SierraExportError};
//!
//! let err: SierraExportError = SierraError::RateLimited { body: "{}".to_string() }.into();
//! assert_eq!(err.kind(), "rate_limited");
//! assert_eq!(err.exit_code(), 4);
//! ```

pub mod errors;
pub mod ids;
pub mod result;

pub use errors::{SierraError, SierraExportError, StorageError, TrackerError};
pub use ids::RangeId;
pub use result::Result;
