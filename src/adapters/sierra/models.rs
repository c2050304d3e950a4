//! Sierra API wire models and range-response classification

use crate::config::{secret_string, SecretString};
use crate::domain::{RangeId, SierraError};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;

/// Body of `POST {root}token`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Short-lived bearer token
///
/// `Debug` output is redacted.
#[derive(Debug, Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: String) -> Self {
        Self(secret_string(token))
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret().as_ref())
    }
}

/// One entry of the record listing used to find the most recent id
#[derive(Debug, Deserialize)]
pub struct RecordEntry {
    pub id: RangeId,
}

/// Body of `GET {root}bibs/`
#[derive(Debug, Deserialize)]
pub struct RecordListResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub entries: Vec<RecordEntry>,
}

impl RecordListResponse {
    /// Largest record id in the listing
    pub fn max_id(&self) -> Option<RangeId> {
        self.entries.iter().map(|e| e.id).max()
    }
}

/// `name` value the API uses when its rate limiter refuses a request
pub const RATE_EXCEEDED: &str = "Rate exceeded for endpoint";
/// `name` value the API uses when the export job behind a request failed
pub const EXTERNAL_PROCESS_FAILED: &str = "External Process Failed";

/// Classification of a successful (2xx) range-export response
#[derive(Debug, Clone, PartialEq)]
pub enum RangeResult {
    /// A MARC file is ready at this URL
    FileReady(String),
    /// No records in the range; carries the raw body to keep as evidence
    EmptyRange(Vec<u8>),
    /// Refused by the rate limiter
    RateLimited(String),
    /// The export job failed upstream
    UpstreamProcessingFailed(String),
    /// Any other body, JSON or not
    Unrecognized(String),
}

/// Terminal outcome of a range request that lets the batch complete
#[derive(Debug, Clone, PartialEq)]
pub enum RangeOutcome {
    FileReady(String),
    EmptyRange(Vec<u8>),
}

impl RangeResult {
    /// Split into outcomes that complete the batch and failures that abort the step
    pub fn into_outcome(self) -> Result<RangeOutcome, SierraError> {
        match self {
            RangeResult::FileReady(url) => Ok(RangeOutcome::FileReady(url)),
            RangeResult::EmptyRange(body) => Ok(RangeOutcome::EmptyRange(body)),
            RangeResult::RateLimited(body) => Err(SierraError::RateLimited { body }),
            RangeResult::UpstreamProcessingFailed(body) => {
                Err(SierraError::UpstreamProcessingFailed { body })
            }
            RangeResult::Unrecognized(body) => Err(SierraError::UnrecognizedResponse { body }),
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            RangeResult::FileReady(_) => "file_ready",
            RangeResult::EmptyRange(_) => "empty_range",
            RangeResult::RateLimited(_) => "rate_limited",
            RangeResult::UpstreamProcessingFailed(_) => "upstream_processing_failed",
            RangeResult::Unrecognized(_) => "unrecognized",
        }
    }
}

/// Classify the body of a 2xx range-export response
///
/// Checked in order: `outputRecords == 0`, a non-empty `file` string, then
/// the `name` of a known refusal. Everything else, including a body that is
/// not JSON at all, is [`RangeResult::Unrecognized`].
pub fn classify_range_response(body: &[u8]) -> RangeResult {
    let raw = || String::from_utf8_lossy(body).into_owned();

    let json: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return RangeResult::Unrecognized(raw()),
    };

    if json.get("outputRecords").and_then(Value::as_u64) == Some(0) {
        return RangeResult::EmptyRange(body.to_vec());
    }

    if let Some(url) = json
        .get("file")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return RangeResult::FileReady(url.to_string());
    }

    match json.get("name").and_then(Value::as_str) {
        Some(RATE_EXCEEDED) => RangeResult::RateLimited(raw()),
        Some(EXTERNAL_PROCESS_FAILED) => RangeResult::UpstreamProcessingFailed(raw()),
        _ => RangeResult::Unrecognized(raw()),
    }
}
