//! Pexels stock photo search client

use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::outbound::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

pub struct PexelsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PexelsClient {
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Single read-only search; reports the top result's large-variant URL.
    /// The address is stable and externally hosted, nothing is downloaded.
    pub async fn search(&self, query: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/search", self.base_url))
            .query(&[("query", query), ("per_page", "1")])
            .header("Authorization", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Payload(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        first_large_url(&body)
            .ok_or_else(|| ProviderError::Payload("no photos in search response".into()))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large: String,
}

fn first_large_url(response: &SearchResponse) -> Option<String> {
    response.photos.first().map(|p| p.src.large.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_first_large_variant() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"photos":[{"src":{"large":"https://x/y.jpg"}}]}"#).unwrap();
        assert_eq!(first_large_url(&body), Some("https://x/y.jpg".to_string()));
    }

    #[test]
    fn empty_result_set_yields_none() {
        let body: SearchResponse = serde_json::from_str(r#"{"photos":[]}"#).unwrap();
        assert_eq!(first_large_url(&body), None);

        let body: SearchResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(first_large_url(&body), None);
    }
}
