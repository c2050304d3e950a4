//! Tracker document and its persistence

pub mod store;
pub mod tracker;

pub use store::{TrackerLock, TrackerStore};
pub use tracker::{Batch, BatchOutcome, CompletionRecord, Tracker};
