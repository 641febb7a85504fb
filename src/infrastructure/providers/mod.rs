//! Concrete image provider adapters
//!
//! One client per remote provider, composed into a single gateway that
//! implements [`ImageProviderPort`]. Credentials come from configuration;
//! base URLs are overridable for tests and self-hosted deployments.

pub mod gemini;
pub mod openai;
pub mod pexels;
pub mod pixabay;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use crate::application::ports::outbound::{ImageProviderPort, ProviderError};
use crate::infrastructure::config::AppConfig;

use gemini::GeminiClient;
use openai::Dalle3Client;
use pexels::PexelsClient;
use pixabay::PixabayClient;

/// Every provider call is bounded; the engine treats expiry as a failure.
const PROVIDER_TIMEOUT_SECS: u64 = 180;

pub struct ProviderGateway {
    pexels: PexelsClient,
    pixabay: PixabayClient,
    dalle3: Dalle3Client,
    gemini: GeminiClient,
}

impl ProviderGateway {
    /// Build a gateway from configuration.
    ///
    /// A missing credential becomes an empty key; the corresponding
    /// provider's call will fail and the engine folds that into a
    /// placeholder.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .context("failed to build provider HTTP client")?;

        let key = |value: &Option<String>| value.clone().unwrap_or_default();
        Ok(Self {
            pexels: PexelsClient::new(
                client.clone(),
                pexels::DEFAULT_BASE_URL,
                key(&config.pexels_api_key),
            ),
            pixabay: PixabayClient::new(
                client.clone(),
                pixabay::DEFAULT_BASE_URL,
                key(&config.pixabay_api_key),
            ),
            dalle3: Dalle3Client::new(
                client.clone(),
                openai::DEFAULT_BASE_URL,
                key(&config.openai_api_key),
            ),
            gemini: GeminiClient::new(
                client,
                gemini::DEFAULT_BASE_URL,
                key(&config.google_api_key),
            ),
        })
    }
}

#[async_trait]
impl ImageProviderPort for ProviderGateway {
    async fn search_pexels(&self, query: &str) -> Result<String, ProviderError> {
        self.pexels.search(query).await
    }

    async fn search_pixabay(&self, query: &str) -> Result<String, ProviderError> {
        self.pixabay.search(query).await
    }

    async fn generate_dalle3(
        &self,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<String, ProviderError> {
        let path = self.dalle3.generate(prompt, output_dir).await?;
        Ok(path.display().to_string())
    }

    async fn generate_gemini(
        &self,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<String, ProviderError> {
        let path = self.gemini.generate(prompt, output_dir).await?;
        Ok(path.display().to_string())
    }
}

/// Fetch a remote image into `output_dir` under a fresh UUID filename.
/// Used by providers whose result URLs are ephemeral.
pub(crate) async fn download_image(
    client: &Client,
    url: &str,
    output_dir: &Path,
) -> Result<PathBuf, ProviderError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ProviderError::Payload(format!(
            "image download returned status {}",
            response.status()
        )));
    }
    let bytes = response.bytes().await?;

    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(format!("{}.jpg", Uuid::new_v4()));
    tokio::fs::write(&path, &bytes).await?;
    Ok(path)
}
