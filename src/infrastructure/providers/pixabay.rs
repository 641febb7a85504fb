//! Pixabay stock photo search client

use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::outbound::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://pixabay.com";

pub struct PixabayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PixabayClient {
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Single read-only search; reports the top hit's large image URL.
    pub async fn search(&self, query: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(format!("{}/api/", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("image_type", "photo"),
                ("per_page", "3"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Payload(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        first_hit_url(&body)
            .ok_or_else(|| ProviderError::Payload("no hits in search response".into()))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "largeImageURL")]
    large_image_url: String,
}

fn first_hit_url(response: &SearchResponse) -> Option<String> {
    response.hits.first().map(|h| h.large_image_url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_first_hit() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"hits":[{"largeImageURL":"https://cdn.pixabay.test/a.jpg"},{"largeImageURL":"https://cdn.pixabay.test/b.jpg"}]}"#,
        )
        .unwrap();
        assert_eq!(
            first_hit_url(&body),
            Some("https://cdn.pixabay.test/a.jpg".to_string())
        );
    }

    #[test]
    fn empty_result_set_yields_none() {
        let body: SearchResponse = serde_json::from_str(r#"{"hits":[]}"#).unwrap();
        assert_eq!(first_hit_url(&body), None);
    }
}
