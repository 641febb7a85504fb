//! Image generation engine
//!
//! Orchestrates one remote acquisition per image slot and guarantees the
//! caller always receives a usable outcome: a hosted URL, a locally
//! persisted asset, or the placeholder. Failures never escape this service;
//! the fold to placeholder happens exactly once, at the public boundary.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::application::ports::outbound::{ImageProviderPort, ProviderError};
use crate::domain::asset::{GenerationOutcome, ImageAsset};
use crate::domain::prompt::ImagePrompt;
use crate::domain::provider::ProviderSelection;

/// Which slide/image slot a generation request is for. Diagnostic only;
/// carried into log context.
#[derive(Debug, Clone, Copy)]
pub struct ImageSlot {
    pub slide_index: usize,
    pub image_index: usize,
}

pub struct ImageGenerationService<P: ImageProviderPort> {
    provider: P,
    /// Resolved once at construction and held for the engine's lifetime.
    selection: ProviderSelection,
    output_dir: PathBuf,
}

impl<P: ImageProviderPort> ImageGenerationService<P> {
    pub fn new(
        provider: P,
        selection: ProviderSelection,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            selection,
            output_dir: output_dir.into(),
        }
    }

    pub fn selection(&self) -> ProviderSelection {
        self.selection
    }

    /// Acquire an image for `prompt`.
    ///
    /// Never fails: a disabled configuration and every remote or local
    /// failure fold into [`GenerationOutcome::Placeholder`]. One network
    /// attempt per call; retry policy belongs to the caller.
    pub async fn generate(
        &self,
        prompt: &ImagePrompt,
        request_id: Option<&str>,
        slot: Option<ImageSlot>,
    ) -> GenerationOutcome {
        let request_id = request_id.unwrap_or("-");
        let context = slot
            .map(|s| format!("slide {}, image {}", s.slide_index, s.image_index))
            .unwrap_or_else(|| "unknown slot".to_string());
        let started = Instant::now();

        tracing::info!(
            request_id,
            %context,
            provider = ?self.selection,
            "image generation requested"
        );

        if self.selection.is_disabled() {
            tracing::warn!(request_id, %context, "image generation disabled, using placeholder");
            return GenerationOutcome::Placeholder;
        }

        // Stock search engines perform poorly on stylistic qualifiers.
        let query = if self.selection.is_stock() {
            prompt.plain_text().to_string()
        } else {
            prompt.themed_text()
        };

        match self.acquire(&query).await {
            Ok(location) => match classify_location(&location) {
                Location::Url => {
                    tracing::info!(
                        request_id,
                        %context,
                        elapsed = ?started.elapsed(),
                        url = %location,
                        "image generated"
                    );
                    GenerationOutcome::RemoteUrl(location)
                }
                Location::LocalFile => {
                    tracing::info!(
                        request_id,
                        %context,
                        elapsed = ?started.elapsed(),
                        path = %location,
                        "image generated"
                    );
                    GenerationOutcome::Local(ImageAsset {
                        path: PathBuf::from(location),
                        is_uploaded: false,
                        prompt: prompt.prompt().to_string(),
                        theme_prompt: prompt.theme_prompt().map(str::to_string),
                    })
                }
                Location::Missing => {
                    tracing::error!(
                        request_id,
                        %context,
                        elapsed = ?started.elapsed(),
                        location = %location,
                        "image not found at reported location, using placeholder"
                    );
                    GenerationOutcome::Placeholder
                }
            },
            Err(err) => {
                tracing::error!(
                    request_id,
                    %context,
                    elapsed = ?started.elapsed(),
                    error = %err,
                    "image generation failed, using placeholder"
                );
                GenerationOutcome::Placeholder
            }
        }
    }

    /// Single provider round-trip, dispatched on the selection held at
    /// construction.
    async fn acquire(&self, query: &str) -> Result<String, ProviderError> {
        let api_started = Instant::now();
        let result = match self.selection {
            ProviderSelection::Disabled => {
                Err(ProviderError::Payload("no provider configured".into()))
            }
            ProviderSelection::Pixabay => self.provider.search_pixabay(query).await,
            ProviderSelection::Pexels => self.provider.search_pexels(query).await,
            ProviderSelection::GeminiFlash => {
                self.provider.generate_gemini(query, &self.output_dir).await
            }
            ProviderSelection::Dalle3 => {
                self.provider.generate_dalle3(query, &self.output_dir).await
            }
        };
        tracing::debug!(api_elapsed = ?api_started.elapsed(), "provider call finished");
        result
    }
}

enum Location {
    Url,
    LocalFile,
    Missing,
}

/// Classify a provider-reported location: a fully-qualified remote address,
/// a path confirmed to exist on local storage, or neither.
fn classify_location(value: &str) -> Location {
    if value.starts_with("http://") || value.starts_with("https://") {
        Location::Url
    } else if !value.is_empty() && Path::new(value).exists() {
        Location::LocalFile
    } else {
        Location::Missing
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;

    enum MockResponse {
        /// Answer every call with this location string.
        Location(String),
        /// Write these bytes under the output directory and answer with the
        /// resulting path (generative calls only).
        WriteBytes(Vec<u8>),
        /// Fail every call.
        Fail,
    }

    struct MockProvider {
        response: MockResponse,
        calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(response: MockResponse) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn answer(&self, query: &str, output_dir: Option<&Path>) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            match &self.response {
                MockResponse::Location(value) => Ok(value.clone()),
                MockResponse::WriteBytes(bytes) => {
                    let dir = output_dir.expect("generative call expected");
                    std::fs::create_dir_all(dir)?;
                    let path = dir.join(format!("{}.jpg", Uuid::new_v4()));
                    std::fs::write(&path, bytes)?;
                    Ok(path.display().to_string())
                }
                MockResponse::Fail => {
                    Err(ProviderError::Payload("simulated provider failure".into()))
                }
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageProviderPort for MockProvider {
        async fn search_pexels(&self, query: &str) -> Result<String, ProviderError> {
            self.answer(query, None)
        }

        async fn search_pixabay(&self, query: &str) -> Result<String, ProviderError> {
            self.answer(query, None)
        }

        async fn generate_dalle3(
            &self,
            prompt: &str,
            output_dir: &Path,
        ) -> Result<String, ProviderError> {
            self.answer(prompt, Some(output_dir))
        }

        async fn generate_gemini(
            &self,
            prompt: &str,
            output_dir: &Path,
        ) -> Result<String, ProviderError> {
            self.answer(prompt, Some(output_dir))
        }
    }

    fn themed_prompt() -> ImagePrompt {
        ImagePrompt::new("a red bicycle", Some("minimalist flat illustration".to_string()))
    }

    fn service(
        response: MockResponse,
        selection: ProviderSelection,
        output_dir: &Path,
    ) -> ImageGenerationService<MockProvider> {
        ImageGenerationService::new(MockProvider::new(response), selection, output_dir)
    }

    #[tokio::test]
    async fn disabled_generation_returns_placeholder_without_network_calls() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            MockResponse::Location("https://x/y.jpg".into()),
            ProviderSelection::Disabled,
            dir.path(),
        );

        let first = svc.generate(&themed_prompt(), None, None).await;
        let second = svc.generate(&themed_prompt(), None, None).await;

        assert_eq!(first, GenerationOutcome::Placeholder);
        // Identical configuration yields the identical placeholder reference.
        assert_eq!(first, second);
        assert_eq!(
            first.public_reference(),
            crate::domain::asset::PLACEHOLDER_IMAGE
        );
        assert_eq!(svc.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn provider_failure_folds_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(MockResponse::Fail, ProviderSelection::Pexels, dir.path());

        let outcome = svc.generate(&themed_prompt(), Some("req-1"), None).await;

        assert_eq!(outcome, GenerationOutcome::Placeholder);
        assert_eq!(svc.provider.call_count(), 1);
    }

    #[tokio::test]
    async fn stock_provider_receives_the_plain_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            MockResponse::Location("https://x/y.jpg".into()),
            ProviderSelection::Pixabay,
            dir.path(),
        );

        let outcome = svc.generate(&themed_prompt(), None, None).await;

        assert_eq!(outcome, GenerationOutcome::RemoteUrl("https://x/y.jpg".into()));
        assert_eq!(svc.provider.queries(), vec!["a red bicycle".to_string()]);
    }

    #[tokio::test]
    async fn generative_provider_receives_the_themed_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            MockResponse::WriteBytes(vec![1, 2, 3]),
            ProviderSelection::Dalle3,
            dir.path(),
        );

        svc.generate(&themed_prompt(), None, None).await;

        assert_eq!(
            svc.provider.queries(),
            vec!["a red bicycle Style: minimalist flat illustration".to_string()]
        );
    }

    #[tokio::test]
    async fn inline_image_yields_a_local_asset_with_prompt_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            MockResponse::WriteBytes(vec![0u8; 4096]),
            ProviderSelection::GeminiFlash,
            dir.path(),
        );

        let outcome = svc
            .generate(
                &themed_prompt(),
                Some("req-2"),
                Some(ImageSlot {
                    slide_index: 1,
                    image_index: 2,
                }),
            )
            .await;

        match outcome {
            GenerationOutcome::Local(asset) => {
                assert_eq!(std::fs::metadata(&asset.path).unwrap().len(), 4096);
                assert!(asset.path.starts_with(dir.path()));
                assert!(!asset.is_uploaded);
                assert_eq!(asset.prompt, "a red bicycle");
                assert_eq!(
                    asset.theme_prompt.as_deref(),
                    Some("minimalist flat illustration")
                );
            }
            other => panic!("expected local asset, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn nonexistent_reported_path_folds_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-written.jpg");
        let svc = service(
            MockResponse::Location(missing.display().to_string()),
            ProviderSelection::Dalle3,
            dir.path(),
        );

        let outcome = svc.generate(&themed_prompt(), None, None).await;

        assert_eq!(outcome, GenerationOutcome::Placeholder);
    }

    #[test]
    fn classification_distinguishes_urls_files_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("present.jpg");
        std::fs::write(&file, b"img").unwrap();

        assert!(matches!(classify_location("https://x/y.jpg"), Location::Url));
        assert!(matches!(classify_location("http://x/y.jpg"), Location::Url));
        assert!(matches!(
            classify_location(&file.display().to_string()),
            Location::LocalFile
        ));
        assert!(matches!(classify_location(""), Location::Missing));
        assert!(matches!(
            classify_location("/definitely/not/here.jpg"),
            Location::Missing
        ));
    }
}
