//! Active image provider selection

/// The image acquisition strategy resolved from configuration.
///
/// At most one provider is active per engine instance. When the configured
/// selector nominally names several providers, a fixed precedence resolves
/// the tie: stock-search providers before generative ones, Pixabay before
/// Pexels, Gemini Flash before DALL-E 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSelection {
    Disabled,
    Pixabay,
    Pexels,
    GeminiFlash,
    Dalle3,
}

impl ProviderSelection {
    /// Resolve the active provider from the configured selector.
    ///
    /// Pure and read-only: safe to evaluate from any number of concurrent
    /// engine constructions. An unset, empty or `disabled` selector turns
    /// generation off entirely.
    pub fn resolve(selector: Option<&str>) -> Self {
        let Some(raw) = selector else {
            return Self::Disabled;
        };
        let raw = raw.trim().to_ascii_lowercase();
        if raw.is_empty() || raw == "disabled" || raw == "none" || raw == "false" {
            return Self::Disabled;
        }

        // Fixed precedence, stock families first.
        if raw.contains("pixabay") {
            Self::Pixabay
        } else if raw.contains("pexels") {
            Self::Pexels
        } else if raw.contains("gemini") {
            Self::GeminiFlash
        } else if raw.contains("dall-e") || raw.contains("dalle") {
            Self::Dalle3
        } else {
            Self::Disabled
        }
    }

    /// Stock-search providers expect bare keywords rather than themed
    /// prompts.
    pub fn is_stock(&self) -> bool {
        matches!(self, Self::Pixabay | Self::Pexels)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_disabled_selector_turns_generation_off() {
        assert_eq!(ProviderSelection::resolve(None), ProviderSelection::Disabled);
        assert_eq!(
            ProviderSelection::resolve(Some("")),
            ProviderSelection::Disabled
        );
        assert_eq!(
            ProviderSelection::resolve(Some("disabled")),
            ProviderSelection::Disabled
        );
        assert_eq!(
            ProviderSelection::resolve(Some("something-else")),
            ProviderSelection::Disabled
        );
    }

    #[test]
    fn each_provider_resolves_by_name() {
        assert_eq!(
            ProviderSelection::resolve(Some("pexels")),
            ProviderSelection::Pexels
        );
        assert_eq!(
            ProviderSelection::resolve(Some("pixabay")),
            ProviderSelection::Pixabay
        );
        assert_eq!(
            ProviderSelection::resolve(Some("gemini_flash")),
            ProviderSelection::GeminiFlash
        );
        assert_eq!(
            ProviderSelection::resolve(Some("dall-e-3")),
            ProviderSelection::Dalle3
        );
    }

    #[test]
    fn stock_providers_take_precedence_over_generative() {
        assert_eq!(
            ProviderSelection::resolve(Some("pexels,dall-e-3")),
            ProviderSelection::Pexels
        );
        assert_eq!(
            ProviderSelection::resolve(Some("pixabay,pexels")),
            ProviderSelection::Pixabay
        );
        assert_eq!(
            ProviderSelection::resolve(Some("dalle,gemini")),
            ProviderSelection::GeminiFlash
        );
    }

    #[test]
    fn stock_flag_matches_selection_family() {
        assert!(ProviderSelection::Pexels.is_stock());
        assert!(ProviderSelection::Pixabay.is_stock());
        assert!(!ProviderSelection::GeminiFlash.is_stock());
        assert!(!ProviderSelection::Dalle3.is_stock());
        assert!(!ProviderSelection::Disabled.is_stock());
    }
}
