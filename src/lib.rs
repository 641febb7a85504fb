//! Deckgen Engine - asset generation and document export core
//!
//! Two independent subsystems share this crate because both solve the same
//! problem: talk to an unreliable remote dependency and hand the caller a
//! deterministic result.
//!
//! - [`application::services::ImageGenerationService`] acquires one image per
//!   slide slot from the configured provider, degrading to a placeholder on
//!   any failure.
//! - [`application::services::ExportService`] turns a presentation id into a
//!   distributable document by delegating rendering to the external
//!   rendering service.
//!
//! HTTP routing, static-file serving and process startup belong to the
//! surrounding server, not to this crate.

pub mod application;
pub mod domain;
pub mod infrastructure;

use application::services::{ExportService, ImageGenerationService};
use domain::provider::ProviderSelection;
use infrastructure::config::AppConfig;
use infrastructure::providers::ProviderGateway;
use infrastructure::renderer::RendererClient;

/// Wire an image generation engine from process configuration.
pub fn image_engine(
    config: &AppConfig,
) -> anyhow::Result<ImageGenerationService<ProviderGateway>> {
    let selection = ProviderSelection::resolve(config.image_provider.as_deref());
    let gateway = ProviderGateway::new(config)?;
    Ok(ImageGenerationService::new(
        gateway,
        selection,
        config.images_dir(),
    ))
}

/// Wire an export service from process configuration.
pub fn export_service(config: &AppConfig) -> anyhow::Result<ExportService<RendererClient>> {
    let renderer = RendererClient::new(&config.renderer_base_url)?;
    Ok(ExportService::new(renderer, config.exports_dir()))
}
