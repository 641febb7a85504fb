//! Gemini Flash multi-modal image generation client

use std::path::{Path, PathBuf};

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::ports::outbound::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const MODEL: &str = "gemini-2.5-flash-image-preview";

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Single multi-modal request; the response interleaves text and inline
    /// image parts. Text parts are diagnostic only; the first image part is
    /// persisted under a fresh UUID filename in `output_dir`.
    pub async fn generate(
        &self,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, ProviderError> {
        let request = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] },
        });
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, MODEL
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Payload(format!(
                "generation returned status {}",
                response.status()
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        let data = extract_inline_image(&body)?;

        tokio::fs::create_dir_all(output_dir).await?;
        let path = output_dir.join(format!("{}.jpg", Uuid::new_v4()));
        tokio::fs::write(&path, &data).await?;
        Ok(path)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

/// Scan all parts for the first inline image. A response with no image data
/// is an error, not something to silently accept.
fn extract_inline_image(response: &GenerateContentResponse) -> Result<Vec<u8>, ProviderError> {
    for part in response
        .candidates
        .iter()
        .flat_map(|c| c.content.parts.iter())
    {
        if let Some(text) = &part.text {
            tracing::debug!(text = %text.chars().take(100).collect::<String>(), "text part in response");
        }
        if let Some(inline) = &part.inline_data {
            return base64::engine::general_purpose::STANDARD
                .decode(&inline.data)
                .map_err(|e| ProviderError::Payload(format!("undecodable inline image: {e}")));
        }
    }
    Err(ProviderError::Payload("no image data in response".into()))
}
