//! Artifact verification
//!
//! Recomputes checksums of downloaded files and compares them with the
//! values recorded in the tracker when each batch completed.

pub mod checksum;
pub mod report;
pub mod verify;

pub use report::{VerificationFailure, VerificationReport};
pub use verify::verify_artifacts;
