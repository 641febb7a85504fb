//! Generation outcomes and image asset metadata

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Fixed placeholder reference, already served by the static layer.
/// Returned whenever image generation is disabled, unconfigured or fails.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.jpg";

/// An image persisted under the output directory, annotated with its
/// originating prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub is_uploaded: bool,
    pub prompt: String,
    pub theme_prompt: Option<String>,
}

/// The result of one image generation attempt.
///
/// Exactly one variant is produced per call; the engine never surfaces a raw
/// error to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    /// Externally hosted image; the provider's address is stable, no local
    /// copy is kept.
    RemoteUrl(String),
    /// Image persisted under the output directory.
    Local(ImageAsset),
    /// The fixed placeholder reference.
    Placeholder,
}

impl GenerationOutcome {
    /// The reference the static layer should hand to clients for this
    /// outcome.
    pub fn public_reference(&self) -> String {
        match self {
            Self::RemoteUrl(url) => url.clone(),
            Self::Local(asset) => asset.path.display().to_string(),
            Self::Placeholder => PLACEHOLDER_IMAGE.to_string(),
        }
    }
}
