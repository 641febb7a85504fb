//! Application configuration

use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment
///
/// Resolved once at process start by the surrounding server and injected
/// into component constructors; never re-read mid-call.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Image provider selector; unset, empty or `disabled` turns generation
    /// off entirely
    pub image_provider: Option<String>,
    /// Pexels API key
    pub pexels_api_key: Option<String>,
    /// Pixabay API key
    pub pixabay_api_key: Option<String>,
    /// OpenAI API key (DALL-E 3)
    pub openai_api_key: Option<String>,
    /// Google API key (Gemini Flash)
    pub google_api_key: Option<String>,
    /// Rendering service base URL
    pub renderer_base_url: String,
    /// Root of the locally served data tree (images/, exports/)
    pub app_data_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            image_provider: env::var("IMAGE_PROVIDER").ok().filter(|v| !v.is_empty()),
            pexels_api_key: env::var("PEXELS_API_KEY").ok(),
            pixabay_api_key: env::var("PIXABAY_API_KEY").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            google_api_key: env::var("GOOGLE_API_KEY").ok(),
            renderer_base_url: env::var("RENDERER_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            app_data_dir: env::var("APP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./app_data")),
        }
    }

    /// Directory where generated images are persisted; exposed by the
    /// static layer.
    pub fn images_dir(&self) -> PathBuf {
        self.app_data_dir.join("images")
    }

    /// Directory where export artifacts land; exposed by the static layer.
    pub fn exports_dir(&self) -> PathBuf {
        self.app_data_dir.join("exports")
    }
}
