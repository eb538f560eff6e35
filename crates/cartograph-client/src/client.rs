//! reqwest client for the analysis service.

use futures::StreamExt;
use tracing::{debug, info};
use url::Url;

use cartograph_core::CartographConfig;

use crate::error::{ClientError, Result};
use crate::request::{HealthStatus, Preview, ScanRequest};
use crate::source::ChunkStream;

/// Preview endpoint path.
pub const PREVIEW_PATH: &str = "/api/v1/preview";

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/";

/// Client for the analysis service.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: reqwest::Client,
    base: Url,
}

impl AnalysisClient {
    /// Create a client for the given base URL.
    pub fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }

    /// Create a client from configuration.
    pub fn from_config(config: &CartographConfig) -> Self {
        Self::new(config.endpoint.clone())
    }

    /// Base URL of the service.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{}{}: {}", self.base, path, e)))
    }

    /// Fails with [`ClientError::Status`] on a non-success response.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body: service_detail(&body),
        })
    }

    /// Opens the event stream for a scan.
    pub async fn stream(&self, request: &ScanRequest) -> Result<ChunkStream> {
        let url = self.url(request.endpoint_path())?;
        info!(url = %url, kind = %request.kind, target = %request.target, "opening scan stream");

        let response = self
            .client
            .post(url)
            .header("Accept", "text/event-stream")
            .json(&request.body())
            .send()
            .await?;
        let response = Self::check(response).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| ClientError::Request(e.to_string()))
            })
            .boxed())
    }

    /// Fetches the scanner's ground truth without running the model.
    pub async fn preview(&self, request: &ScanRequest) -> Result<Preview> {
        let url = self.url(PREVIEW_PATH)?;
        debug!(url = %url, target = %request.target, "requesting preview");

        let response = self.client.post(url).json(&request.body()).send().await?;
        let preview: Preview = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        debug!(files = preview.files.len(), "preview received");
        Ok(preview)
    }

    /// Queries service health.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.url(HEALTH_PATH)?;
        let response = self.client.get(url).send().await?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Extracts `detail` from an error body, or returns it unchanged.
fn service_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let client = AnalysisClient::new(Url::parse("http://localhost:8000").unwrap());
        assert_eq!(
            client.url("/api/v1/analyze").unwrap().as_str(),
            "http://localhost:8000/api/v1/analyze"
        );
        assert_eq!(client.url(HEALTH_PATH).unwrap().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_service_detail() {
        assert_eq!(service_detail("{\"detail\":\"No source files found.\"}"), "No source files found.");
        assert_eq!(service_detail("  Bad Gateway \n"), "Bad Gateway");
    }
}
