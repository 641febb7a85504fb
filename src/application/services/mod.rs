//! Application services

mod export_service;
mod image_generation_service;

pub use export_service::{sanitize_filename, ExportService};
pub use image_generation_service::{ImageGenerationService, ImageSlot};
