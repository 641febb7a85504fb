use std::path::Path;

use async_trait::async_trait;

/// Errors surfaced by provider adapters.
///
/// The generation engine folds every one of these into a placeholder outcome
/// at its public boundary; the typed variants exist so the internal steps
/// stay testable.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned unusable payload: {0}")]
    Payload(String),
    #[error("failed to persist image: {0}")]
    Storage(#[from] std::io::Error),
}

/// Remote image acquisition operations the engine requires.
///
/// Each method performs a single network attempt and returns the location of
/// the acquired image: stock searches report an externally hosted URL, the
/// generative calls persist the image under `output_dir` and report its
/// path. The engine classifies the returned location uniformly.
#[async_trait]
pub trait ImageProviderPort: Send + Sync {
    /// Pexels photo search; reports the first result's large-variant URL.
    async fn search_pexels(&self, query: &str) -> Result<String, ProviderError>;

    /// Pixabay photo search; reports the first hit's large image URL.
    async fn search_pixabay(&self, query: &str) -> Result<String, ProviderError>;

    /// DALL-E 3 generation. The response URL is ephemeral, so the image is
    /// downloaded into `output_dir` and its local path reported.
    async fn generate_dalle3(
        &self,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<String, ProviderError>;

    /// Gemini Flash multi-modal generation; the first inline image part is
    /// persisted under `output_dir` and its local path reported.
    async fn generate_gemini(
        &self,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<String, ProviderError>;
}
