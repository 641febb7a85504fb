//! Rendering service client
//!
//! Talks to the external rendering service over its two export endpoints.
//! Calls are bounded by a generous timeout because the upstream drives a
//! slow browser-based rendering pipeline; a single attempt per call, no
//! retry and no partial results.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::{ExportError, RendererPort};
use crate::domain::export::{PackageModel, PresentationId};

/// Upstream rendering can take minutes per document.
const EXPORT_TIMEOUT_SECS: u64 = 300;

/// Client for the rendering service API
pub struct RendererClient {
    client: Client,
    base_url: String,
}

impl RendererClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(EXPORT_TIMEOUT_SECS))
            .build()
            .context("failed to build rendering service HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ExportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ExportError::UpstreamRejected {
            status: status.as_u16(),
            message,
        })
    }
}

fn map_transport_error(err: reqwest::Error) -> ExportError {
    if err.is_timeout() {
        ExportError::Timeout(EXPORT_TIMEOUT_SECS)
    } else if err.is_decode() {
        ExportError::MalformedResponse(err.to_string())
    } else {
        ExportError::UpstreamUnavailable(err.to_string())
    }
}

#[async_trait]
impl RendererPort for RendererClient {
    async fn fetch_package_model(
        &self,
        id: PresentationId,
    ) -> Result<PackageModel, ExportError> {
        let response = self
            .client
            .get(format!("{}/api/presentation_to_pptx_model", self.base_url))
            .query(&[("id", id.to_string())])
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = Self::check_status(response).await?;
        response
            .json::<PackageModel>()
            .await
            .map_err(|e| ExportError::MalformedResponse(e.to_string()))
    }

    async fn render_pdf(
        &self,
        id: PresentationId,
        title: &str,
    ) -> Result<String, ExportError> {
        let request = PdfExportRequest {
            id: id.to_string(),
            title: title.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/api/export-as-pdf", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = Self::check_status(response).await?;
        let body: PdfExportResponse = response
            .json()
            .await
            .map_err(|e| ExportError::MalformedResponse(e.to_string()))?;
        Ok(body.path)
    }
}

#[derive(Debug, Serialize)]
struct PdfExportRequest {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct PdfExportResponse {
    path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_response_carries_the_artifact_path() {
        let body: PdfExportResponse =
            serde_json::from_str(r#"{"path":"/exports/q1.pdf"}"#).unwrap();
        assert_eq!(body.path, "/exports/q1.pdf");
    }

    #[test]
    fn base_url_is_normalized() {
        let client = RendererClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }
}
