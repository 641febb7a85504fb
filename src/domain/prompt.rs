//! Image prompt value object

use serde::{Deserialize, Serialize};

/// A textual description of an image to acquire, plus an optional
/// presentation-theme qualifier.
///
/// Two renderings are derivable: [`plain_text`](Self::plain_text) for
/// stock-search providers, which expect bare keywords, and
/// [`themed_text`](Self::themed_text) for generative providers, which
/// benefit from style context. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePrompt {
    prompt: String,
    theme_prompt: Option<String>,
}

impl ImagePrompt {
    pub fn new(prompt: impl Into<String>, theme_prompt: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            theme_prompt: theme_prompt.filter(|t| !t.trim().is_empty()),
        }
    }

    /// The bare prompt, as sent to stock-search providers.
    pub fn plain_text(&self) -> &str {
        &self.prompt
    }

    /// The prompt with theme context appended, as sent to generative
    /// providers.
    pub fn themed_text(&self) -> String {
        match &self.theme_prompt {
            Some(theme) => format!("{} Style: {}", self.prompt, theme),
            None => self.prompt.clone(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn theme_prompt(&self) -> Option<&str> {
        self.theme_prompt.as_deref()
    }
}
