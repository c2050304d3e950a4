//! Catalog API trait definition
//!
//! [`CatalogApi`] is the seam between the export step and the Sierra REST
//! API. The production implementation is [`SierraClient`](super::SierraClient);
//! tests drive the export step with in-memory implementations.

use super::models::{AccessToken, RangeResult};
use crate::adapters::filesystem::PartialArtifact;
use crate::domain::{RangeId, Result};
use async_trait::async_trait;

/// Operations the export step needs from the catalog
///
/// Implementations must not retry internally: a failed call aborts the step
/// and the next invocation resumes from the tracker.
///
/// # Example
///
/// ```no_run
/// use sierra_export::adapters::sierra::{CatalogApi, SierraClient};
/// use sierra_export::config::load_config;
/// use sierra_export::domain::RangeId;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = load_config("sierra-export.toml")?;
/// let client = SierraClient::new(&config.sierra, config.export.latest_lookback_days)?;
///
/// let token = client.authenticate().await?;
/// let result = client
///     .request_range(&token, RangeId::new(1_000_000), RangeId::new(1_000_049))
///     .await?;
/// println!("{}", result.label());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Exchange the client credentials for a bearer token
    ///
    /// # Errors
    ///
    /// `SierraError::AuthenticationFailed` on a non-success status or a body
    /// without `access_token`.
    async fn authenticate(&self) -> Result<AccessToken>;

    /// Most recent record id in the catalog
    async fn latest_record_id(&self, token: &AccessToken) -> Result<RangeId>;

    /// Ask for every record in `[start, end]` and classify the answer
    ///
    /// A non-success status is returned as an error, never as a
    /// [`RangeResult`].
    async fn request_range(
        &self,
        token: &AccessToken,
        start: RangeId,
        end: RangeId,
    ) -> Result<RangeResult>;

    /// Stream the file at `url` into `artifact`
    ///
    /// The caller commits the artifact on success; on error it is dropped
    /// and its partial file removed.
    async fn download(
        &self,
        token: &AccessToken,
        url: &str,
        artifact: &mut PartialArtifact,
    ) -> Result<()>;
}
