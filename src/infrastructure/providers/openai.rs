//! DALL-E 3 image generation client

use std::path::{Path, PathBuf};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::ProviderError;
use crate::infrastructure::providers::download_image;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct Dalle3Client {
    client: Client,
    base_url: String,
    api_key: String,
}

impl Dalle3Client {
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Single round-trip for one square image at the default resolution.
    ///
    /// The returned URL is ephemeral, so the image is downloaded into
    /// `output_dir` before it is reported; this provider always yields a
    /// local file.
    pub async fn generate(
        &self,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, ProviderError> {
        let request = GenerationsRequest {
            model: "dall-e-3",
            prompt,
            n: 1,
            quality: "standard",
            size: "1024x1024",
        };
        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Payload(format!(
                "generation returned status {}",
                response.status()
            )));
        }

        let body: GenerationsResponse = response.json().await?;
        let url = body
            .data
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| ProviderError::Payload("no image in generations response".into()))?;

        download_image(&self.client, &url, output_dir).await
    }
}

#[derive(Debug, Serialize)]
struct GenerationsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    quality: &'a str,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationsResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_url_is_extracted() {
        let body: GenerationsResponse =
            serde_json::from_str(r#"{"created":1,"data":[{"url":"https://oai/img.png"}]}"#)
                .unwrap();
        assert_eq!(body.data[0].url, "https://oai/img.png");
    }

    #[test]
    fn empty_data_deserializes() {
        let body: GenerationsResponse = serde_json::from_str(r#"{"created":1}"#).unwrap();
        assert!(body.data.is_empty());
    }
}
