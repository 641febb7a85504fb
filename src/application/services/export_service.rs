//! Presentation export orchestration
//!
//! Package exports are a two-phase protocol: the rendering service supplies
//! the package-description document, and this service renders it into the
//! concrete container locally, staging media in a transient workspace. PDF
//! exports are a single remote call; the rendering service does everything.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::application::ports::outbound::{ExportError, RendererPort};
use crate::domain::export::{
    ExportFormat, ExportRequest, ExportResult, PackageModel, ShapeModel,
};
use crate::infrastructure::pptx::PackageBuilder;
use crate::infrastructure::workspace::TransientWorkspace;

/// Staged media files are small objects; bound their fetches tighter than
/// the renderer calls.
const MEDIA_STAGING_TIMEOUT_SECS: u64 = 60;

pub struct ExportService<R: RendererPort> {
    renderer: R,
    http: reqwest::Client,
    exports_dir: PathBuf,
    media_timeout: Duration,
}

impl<R: RendererPort> ExportService<R> {
    pub fn new(renderer: R, exports_dir: impl Into<PathBuf>) -> Self {
        Self::with_media_timeout(
            renderer,
            exports_dir,
            Duration::from_secs(MEDIA_STAGING_TIMEOUT_SECS),
        )
    }

    /// Like [`new`](Self::new) with an explicit bound on media staging
    /// downloads.
    pub fn with_media_timeout(
        renderer: R,
        exports_dir: impl Into<PathBuf>,
        media_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            http: reqwest::Client::new(),
            exports_dir: exports_dir.into(),
            media_timeout,
        }
    }

    /// Export a presentation to the requested format.
    ///
    /// Unlike image generation there is no safe fallback document, so every
    /// failure surfaces as a typed [`ExportError`]; retrying the whole
    /// export is the caller's decision.
    pub async fn export(&self, request: &ExportRequest) -> Result<ExportResult, ExportError> {
        match request.format {
            ExportFormat::Pptx => self.export_package(request).await,
            ExportFormat::Pdf => self.export_pdf(request).await,
        }
    }

    async fn export_package(&self, request: &ExportRequest) -> Result<ExportResult, ExportError> {
        let started = Instant::now();
        tracing::info!(presentation_id = %request.presentation_id, "package export requested");

        let mut model = self
            .renderer
            .fetch_package_model(request.presentation_id)
            .await?;

        let workspace = TransientWorkspace::create()
            .map_err(|e| ExportError::LocalWriteFailure(e.to_string()))?;
        self.stage_media(&mut model, workspace.path()).await;

        // Build inside the workspace so a failed build never leaves a
        // partial artifact at the served path.
        let staged = workspace.path().join("package.pptx");
        PackageBuilder::new(&model)
            .build(&staged)
            .map_err(|e| ExportError::LocalWriteFailure(format!("{e:#}")))?;

        std::fs::create_dir_all(&self.exports_dir)
            .map_err(|e| ExportError::LocalWriteFailure(e.to_string()))?;
        let output_path = self
            .exports_dir
            .join(format!("{}.pptx", sanitize_filename(&request.title)));
        std::fs::copy(&staged, &output_path)
            .map_err(|e| ExportError::LocalWriteFailure(e.to_string()))?;

        // The artifact is out; the workspace has served its purpose.
        if let Err(err) = workspace.close() {
            tracing::warn!(error = %err, "failed to remove export workspace");
        }

        tracing::info!(
            presentation_id = %request.presentation_id,
            path = %output_path.display(),
            elapsed = ?started.elapsed(),
            "package export completed"
        );
        Ok(ExportResult {
            presentation_id: request.presentation_id,
            path: output_path,
        })
    }

    async fn export_pdf(&self, request: &ExportRequest) -> Result<ExportResult, ExportError> {
        let started = Instant::now();
        tracing::info!(presentation_id = %request.presentation_id, "pdf export requested");

        let title = sanitize_filename(&request.title);
        let path = self
            .renderer
            .render_pdf(request.presentation_id, &title)
            .await?;

        tracing::info!(
            presentation_id = %request.presentation_id,
            path = %path,
            elapsed = ?started.elapsed(),
            "pdf export completed"
        );
        Ok(ExportResult {
            presentation_id: request.presentation_id,
            path: PathBuf::from(path),
        })
    }

    /// Download remote picture media into the workspace so the builder only
    /// deals with local files. Unfetchable media is skipped with a warning
    /// rather than failing the whole deck.
    async fn stage_media(&self, model: &mut PackageModel, workspace: &Path) {
        for slide in &mut model.slides {
            for shape in &mut slide.shapes {
                let ShapeModel::Picture { src, .. } = shape else {
                    continue;
                };
                if !(src.starts_with("http://") || src.starts_with("https://")) {
                    continue;
                }
                match self.download_to(src, workspace).await {
                    Ok(path) => *src = path.display().to_string(),
                    Err(err) => {
                        tracing::warn!(url = %src, error = %err, "skipping unfetchable picture");
                        src.clear();
                    }
                }
            }
        }
    }

    async fn download_to(&self, url: &str, dir: &Path) -> anyhow::Result<PathBuf> {
        let response = self
            .http
            .get(url)
            .timeout(self.media_timeout)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), media_extension(url)));
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

fn media_extension(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('.').next() {
        Some("png") => "png",
        Some("jpeg") => "jpeg",
        _ => "jpg",
    }
}

/// Make a title safe to use as a file name.
///
/// Path separators, Windows-reserved characters and control characters are
/// replaced and surrounding dots trimmed, so the result can never escape the
/// exports directory. An unusable result is replaced by a fresh UUID token.
pub fn sanitize_filename(title: &str) -> String {
    let mut cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    let cleaned = cleaned.trim().trim_matches('.').trim().to_string();

    if cleaned.chars().all(|c| c == '_' || c == ' ') {
        Uuid::new_v4().to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::export::{PresentationId, ShapeBox, SlideModel};

    struct MockRenderer {
        package: Mutex<Option<Result<PackageModel, ExportError>>>,
        pdf: Mutex<Option<Result<String, ExportError>>>,
        pdf_titles: Mutex<Vec<String>>,
    }

    impl MockRenderer {
        fn with_package(result: Result<PackageModel, ExportError>) -> Self {
            Self {
                package: Mutex::new(Some(result)),
                pdf: Mutex::new(None),
                pdf_titles: Mutex::new(Vec::new()),
            }
        }

        fn with_pdf(result: Result<String, ExportError>) -> Self {
            Self {
                package: Mutex::new(None),
                pdf: Mutex::new(Some(result)),
                pdf_titles: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RendererPort for MockRenderer {
        async fn fetch_package_model(
            &self,
            _id: PresentationId,
        ) -> Result<PackageModel, ExportError> {
            self.package
                .lock()
                .unwrap()
                .take()
                .expect("unexpected package-model call")
        }

        async fn render_pdf(
            &self,
            _id: PresentationId,
            title: &str,
        ) -> Result<String, ExportError> {
            self.pdf_titles.lock().unwrap().push(title.to_string());
            self.pdf
                .lock()
                .unwrap()
                .take()
                .expect("unexpected pdf call")
        }
    }

    fn one_slide_model() -> PackageModel {
        PackageModel {
            name: Some("Demo".to_string()),
            slides: vec![SlideModel {
                shapes: vec![ShapeModel::TextBox {
                    text: "Quarterly summary".to_string(),
                    font_size: 24,
                    position: ShapeBox::default(),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn pdf_export_returns_the_renderer_path() {
        let renderer = MockRenderer::with_pdf(Ok("/exports/q1.pdf".to_string()));
        let exports = tempfile::tempdir().unwrap();
        let svc = ExportService::new(renderer, exports.path());

        let request = ExportRequest {
            presentation_id: PresentationId::new(),
            title: "Q1 Report".to_string(),
            format: ExportFormat::Pdf,
        };
        let result = svc.export(&request).await.unwrap();

        assert_eq!(result.path, PathBuf::from("/exports/q1.pdf"));
        assert_eq!(result.presentation_id, request.presentation_id);
        assert_eq!(
            svc.renderer.pdf_titles.lock().unwrap().clone(),
            vec!["Q1 Report".to_string()]
        );
    }

    #[tokio::test]
    async fn package_export_builds_an_artifact_under_the_exports_directory() {
        let renderer = MockRenderer::with_package(Ok(one_slide_model()));
        let exports = tempfile::tempdir().unwrap();
        let svc = ExportService::new(renderer, exports.path());

        let request = ExportRequest {
            presentation_id: PresentationId::new(),
            title: "My Deck".to_string(),
            format: ExportFormat::Pptx,
        };
        let result = svc.export(&request).await.unwrap();

        assert_eq!(result.path, exports.path().join("My Deck.pptx"));
        assert!(std::fs::metadata(&result.path).unwrap().len() > 0);

        let file = std::fs::File::open(&result.path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert!(archive.by_name("ppt/slides/slide1.xml").is_ok());
    }

    #[tokio::test]
    async fn media_staging_is_bounded_by_a_timeout() {
        // A host that accepts connections and never responds.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let model = PackageModel {
            name: None,
            slides: vec![SlideModel {
                shapes: vec![ShapeModel::Picture {
                    src: format!("http://{addr}/img.png"),
                    position: ShapeBox::default(),
                }],
            }],
        };
        let renderer = MockRenderer::with_package(Ok(model));
        let exports = tempfile::tempdir().unwrap();
        let svc = ExportService::with_media_timeout(
            renderer,
            exports.path(),
            Duration::from_millis(250),
        );

        let request = ExportRequest {
            presentation_id: PresentationId::new(),
            title: "Hung media".to_string(),
            format: ExportFormat::Pptx,
        };
        let result = tokio::time::timeout(Duration::from_secs(10), svc.export(&request))
            .await
            .expect("export must not hang on an unresponsive media host")
            .unwrap();

        // The unfetchable picture is skipped; the deck still exports.
        assert!(result.path.is_file());
    }

    #[tokio::test]
    async fn failed_persist_leaves_nothing_at_the_final_path() {
        let renderer = MockRenderer::with_package(Ok(one_slide_model()));
        let exports = tempfile::tempdir().unwrap();
        // Occupy the destination with a directory so the final copy fails.
        std::fs::create_dir_all(exports.path().join("Blocked.pptx")).unwrap();
        let svc = ExportService::new(renderer, exports.path());

        let request = ExportRequest {
            presentation_id: PresentationId::new(),
            title: "Blocked".to_string(),
            format: ExportFormat::Pptx,
        };
        match svc.export(&request).await {
            Err(ExportError::LocalWriteFailure(_)) => {}
            other => panic!("expected local write failure, got {other:?}"),
        }
        assert!(!exports.path().join("Blocked.pptx").is_file());
    }

    #[tokio::test]
    async fn upstream_timeout_surfaces_as_a_typed_error() {
        let renderer = MockRenderer::with_package(Err(ExportError::Timeout(300)));
        let exports = tempfile::tempdir().unwrap();
        let svc = ExportService::new(renderer, exports.path());

        let request = ExportRequest {
            presentation_id: PresentationId::new(),
            title: "Slow".to_string(),
            format: ExportFormat::Pptx,
        };

        match svc.export(&request).await {
            Err(ExportError::Timeout(secs)) => assert_eq!(secs, 300),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn sanitization_strips_separators_and_traversal() {
        let sanitized = sanitize_filename("../../etc/passwd");
        assert!(!sanitized.contains('/'));
        assert!(!sanitized.contains('\\'));
        assert!(!sanitized.contains(".."));

        let sanitized = sanitize_filename("a:b*c?d\"e<f>g|h\\i/j");
        for c in ['/', '\\', ':', '*', '?', '"', '<', '>', '|'] {
            assert!(!sanitized.contains(c), "{c} survived sanitization");
        }
    }

    #[test]
    fn unusable_titles_become_a_uuid_token() {
        for title in ["", "   ", "///", "..", "??**"] {
            let sanitized = sanitize_filename(title);
            assert!(
                Uuid::parse_str(&sanitized).is_ok(),
                "expected uuid for {title:?}, got {sanitized:?}"
            );
        }
    }

    #[test]
    fn ordinary_titles_pass_through() {
        assert_eq!(sanitize_filename("Q1 Report"), "Q1 Report");
    }

    #[test]
    fn media_extension_is_derived_from_the_url_path() {
        assert_eq!(media_extension("https://x/y.png"), "png");
        assert_eq!(media_extension("https://x/y.jpeg?size=large"), "jpeg");
        assert_eq!(media_extension("https://x/y"), "jpg");
    }
}
