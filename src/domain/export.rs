//! Export requests, results and the package-description model

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a presentation owned by the surrounding service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresentationId(pub Uuid);

impl PresentationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PresentationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PresentationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Target document format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Slide-deck package, constructed locally from the package-description
    /// document.
    Pptx,
    /// Rendered fully by the rendering service.
    Pdf,
}

/// A validated export request from the routing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub presentation_id: PresentationId,
    /// Human-readable title; sanitized before it becomes a filename.
    pub title: String,
    pub format: ExportFormat,
}

/// The produced artifact, now owned by the exports directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResult {
    pub presentation_id: PresentationId,
    pub path: PathBuf,
}

/// Package-description document returned by the rendering service for the
/// package export path.
///
/// The rendering service supplies structure; the local builder renders it
/// into the concrete container format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageModel {
    #[serde(default)]
    pub name: Option<String>,
    pub slides: Vec<SlideModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideModel {
    #[serde(default)]
    pub shapes: Vec<ShapeModel>,
}

/// Shape position and extent, in points. Defaults to a full 10x7.5 inch
/// slide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShapeBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for ShapeBox {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 720.0,
            height: 540.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeModel {
    TextBox {
        text: String,
        #[serde(default = "default_font_size")]
        font_size: u32,
        #[serde(default)]
        position: ShapeBox,
    },
    Picture {
        /// Remote URL or a path already on local storage. Remote sources are
        /// staged into the export workspace before the builder runs.
        src: String,
        #[serde(default)]
        position: ShapeBox,
    },
}

fn default_font_size() -> u32 {
    18
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_model_deserializes_with_defaults() {
        let raw = r#"{
            "slides": [
                {"shapes": [
                    {"type": "text_box", "text": "Hello"},
                    {"type": "picture", "src": "https://cdn.example/img.png"}
                ]},
                {}
            ]
        }"#;

        let model: PackageModel = serde_json::from_str(raw).unwrap();
        assert_eq!(model.slides.len(), 2);
        assert!(model.name.is_none());
        match &model.slides[0].shapes[0] {
            ShapeModel::TextBox {
                text, font_size, ..
            } => {
                assert_eq!(text, "Hello");
                assert_eq!(*font_size, 18);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
        assert!(model.slides[1].shapes.is_empty());
    }
}
