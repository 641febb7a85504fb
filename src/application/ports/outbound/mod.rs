//! Outbound ports - interfaces that the application requires from external systems

mod image_provider_port;
mod renderer_port;

pub use image_provider_port::{ImageProviderPort, ProviderError};
pub use renderer_port::{ExportError, RendererPort};
