use async_trait::async_trait;

use crate::domain::export::{PackageModel, PresentationId};

/// Errors surfaced by the export path.
///
/// There is no safe universal fallback for the user's requested document, so
/// unlike image generation these propagate to the caller, who decides
/// whether to retry the whole export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("rendering service is unreachable: {0}")]
    UpstreamUnavailable(String),
    #[error("rendering service rejected the request (status {status}): {message}")]
    UpstreamRejected { status: u16, message: String },
    #[error("rendering service did not respond within {0} seconds")]
    Timeout(u64),
    #[error("rendering service returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("failed to write export artifact: {0}")]
    LocalWriteFailure(String),
}

/// The two rendering-service operations the export service requires.
#[async_trait]
pub trait RendererPort: Send + Sync {
    /// Ask the rendering service to convert a presentation into a
    /// package-description document.
    async fn fetch_package_model(
        &self,
        id: PresentationId,
    ) -> Result<PackageModel, ExportError>;

    /// Ask the rendering service to render a presentation straight to PDF.
    /// Returns the path of the produced artifact.
    async fn render_pdf(
        &self,
        id: PresentationId,
        title: &str,
    ) -> Result<String, ExportError>;
}
