//! Core value objects shared across the engine

pub mod asset;
pub mod export;
pub mod prompt;
pub mod provider;

pub use asset::{GenerationOutcome, ImageAsset, PLACEHOLDER_IMAGE};
pub use export::{ExportFormat, ExportRequest, ExportResult, PresentationId};
pub use prompt::ImagePrompt;
pub use provider::ProviderSelection;
