//! Sierra REST API adapter
//!
//! The [`CatalogApi`] trait defines what the export step needs from the
//! catalog; [`SierraClient`] implements it over HTTP. Range responses are
//! classified in [`models::classify_range_response`].

pub mod client;
pub mod models;
mod r#trait;

pub use client::SierraClient;
pub use models::{
    classify_range_response, AccessToken, RangeOutcome, RangeResult, RecordListResponse,
};
pub use r#trait::CatalogApi;
