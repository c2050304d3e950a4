//! Sierra REST API client
//!
//! Every call carries an explicit timeout: the connect timeout is set on the
//! underlying client and each request sets its own total timeout (token,
//! range/listing, download). Nothing is retried here.

use super::models::{
    classify_range_response, AccessToken, RangeResult, RecordListResponse, TokenResponse,
};
use super::CatalogApi;
use crate::adapters::filesystem::PartialArtifact;
use crate::config::SierraConfig;
use crate::domain::{RangeId, Result, SierraError, SierraExportError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration as ChronoDuration, Utc};
use futures::StreamExt;
use reqwest::{Client, ClientBuilder, Response};
use secrecy::ExposeSecret;
use url::Url;

/// Production [`CatalogApi`] implementation
#[derive(Debug, Clone)]
pub struct SierraClient {
    client: Client,
    root: Url,
    client_key: String,
    config: SierraConfig,
    latest_lookback_days: u32,
}

impl SierraClient {
    /// Build a client from the `[sierra]` configuration
    ///
    /// # Errors
    ///
    /// `SierraExportError::Configuration` if the root URL does not parse or
    /// the HTTP client cannot be built.
    pub fn new(config: &SierraConfig, latest_lookback_days: u32) -> Result<Self> {
        let mut root_str = config.api_root_url.clone();
        if !root_str.ends_with('/') {
            root_str.push('/');
        }
        let root = Url::parse(&root_str).map_err(|e| {
            SierraExportError::Configuration(format!("Invalid sierra.api_root_url: {e}"))
        })?;

        let mut client_builder = ClientBuilder::new()
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("sierra-export/", env!("CARGO_PKG_VERSION")));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the Sierra API");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            SierraExportError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            root,
            client_key: config.client_key.clone(),
            config: config.clone(),
            latest_lookback_days,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.root.join(path).map_err(|e| {
            SierraExportError::Configuration(format!("Invalid endpoint '{path}': {e}"))
        })
    }

    /// Basic credentials for the token endpoint
    fn basic_auth_header(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.client_key,
            self.config.client_secret.expose_secret().as_ref()
        );
        format!("Basic {}", general_purpose::STANDARD.encode(credentials.as_bytes()))
    }

    /// Turn a non-success response into `UnexpectedStatus`, keeping the body
    async fn reject_status(endpoint: &Url, response: Response) -> SierraError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        SierraError::UnexpectedStatus {
            endpoint: endpoint.path().to_string(),
            status,
            body,
        }
    }
}

#[async_trait]
impl CatalogApi for SierraClient {
    async fn authenticate(&self) -> Result<AccessToken> {
        let url = self.endpoint("token")?;
        tracing::debug!(url = %url, "Requesting access token");

        let response = self
            .client
            .post(url.clone())
            .header("Authorization", self.basic_auth_header())
            .timeout(self.config.token_timeout())
            .send()
            .await
            .map_err(|e| SierraError::from_transport("token request", &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SierraError::from_transport("token response", &e))?;

        if !status.is_success() {
            return Err(SierraError::AuthenticationFailed(format!(
                "token request returned status {}: {}",
                status.as_u16(),
                body
            ))
            .into());
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            SierraError::AuthenticationFailed(format!("unusable token response ({e}): {body}"))
        })?;

        if token.access_token.is_empty() {
            return Err(
                SierraError::AuthenticationFailed("token response has empty access_token".into())
                    .into(),
            );
        }

        tracing::info!("Authenticated with Sierra API");
        Ok(AccessToken::new(token.access_token))
    }

    async fn latest_record_id(&self, token: &AccessToken) -> Result<RangeId> {
        let url = self.endpoint("bibs/")?;
        let since = Utc::now() - ChronoDuration::days(i64::from(self.latest_lookback_days));
        let created = format!("[{},]", since.format("%Y-%m-%dT%H:%M:%SZ"));

        tracing::debug!(url = %url, created_date = %created, "Fetching most recent record id");

        let response = self
            .client
            .get(url.clone())
            .header("Authorization", token.bearer())
            .query(&[
                ("limit", "1000"),
                ("fields", "id"),
                ("deleted", "false"),
                ("createdDate", created.as_str()),
            ])
            .timeout(self.config.request_timeout())
            .send()
            .await
            .map_err(|e| SierraError::from_transport("record listing", &e))?;

        if !response.status().is_success() {
            return Err(Self::reject_status(&url, response).await.into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SierraError::from_transport("record listing response", &e))?;

        let listing: RecordListResponse = serde_json::from_slice(&body).map_err(|e| {
            SierraError::InvalidResponse(format!(
                "record listing did not parse ({e}): {}",
                String::from_utf8_lossy(&body)
            ))
        })?;

        let latest = listing.max_id().ok_or_else(|| {
            SierraError::InvalidResponse(format!(
                "no records created in the last {} days; cannot resolve last bib",
                self.latest_lookback_days
            ))
        })?;

        tracing::info!(
            latest = %latest,
            entries = listing.entries.len(),
            total = ?listing.total,
            "Resolved most recent record id"
        );
        Ok(latest)
    }

    async fn request_range(
        &self,
        token: &AccessToken,
        start: RangeId,
        end: RangeId,
    ) -> Result<RangeResult> {
        let url = self.endpoint("bibs/marc")?;
        let id = format!("[{start},{end}]");
        let limit = start
            .distance_to(end)
            .map(|d| d.saturating_add(1))
            .unwrap_or(1)
            .to_string();

        tracing::debug!(url = %url, id = %id, limit = %limit, "Requesting record range");

        let response = self
            .client
            .get(url.clone())
            .header("Authorization", token.bearer())
            .query(&[("id", id.as_str()), ("limit", limit.as_str()), ("mapping", "toc")])
            .timeout(self.config.request_timeout())
            .send()
            .await
            .map_err(|e| SierraError::from_transport("range request", &e))?;

        let status = response.status();
        if !status.is_success() {
            let err = Self::reject_status(&url, response).await;
            tracing::error!(status = status.as_u16(), error = %err, "Range request failed");
            return Err(err.into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SierraError::from_transport("range response", &e))?;

        let result = classify_range_response(&body);
        tracing::debug!(
            status = status.as_u16(),
            classification = result.label(),
            body = %String::from_utf8_lossy(&body),
            "Range response classified"
        );
        Ok(result)
    }

    async fn download(
        &self,
        token: &AccessToken,
        url: &str,
        artifact: &mut PartialArtifact,
    ) -> Result<()> {
        let file_url = Url::parse(url)
            .or_else(|_| self.root.join(url))
            .map_err(|e| SierraExportError::Download(format!("invalid file url '{url}': {e}")))?;

        tracing::debug!(url = %file_url, "Downloading file");

        let response = self
            .client
            .get(file_url.clone())
            .header("Authorization", token.bearer())
            .timeout(self.config.download_timeout())
            .send()
            .await
            .map_err(|e| SierraExportError::Download(format!("request to {file_url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SierraExportError::Download(format!(
                "download of {file_url} returned status {}: {body}",
                status.as_u16()
            )));
        }

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                SierraExportError::Download(format!("reading {file_url} failed: {e}"))
            })?;
            artifact.write_chunk(&chunk).await?;
        }

        tracing::debug!(url = %file_url, bytes = artifact.bytes_written(), "Download finished");
        Ok(())
    }
}
