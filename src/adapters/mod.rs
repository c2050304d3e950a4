//! External system integrations for sierra-export.
//!
//! - [`sierra`] - Sierra REST API: token, record listing, range export, file download
//! - [`filesystem`] - atomic artifact writes into the download directory
//!
//! Adapters isolate external dependencies so the export step can be tested
//! with in-memory implementations of [`sierra::CatalogApi`].

pub mod filesystem;
pub mod sierra;
