//! Translation service configuration

use serde::Deserialize;

/// Translation service configuration
///
/// An absent endpoint is valid: inbound text is then matched as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationConfig {
    /// Translate-to-English endpoint
    pub endpoint: Option<String>,
}

impl TranslationConfig {
    /// True when a real translation service is configured
    pub fn is_configured(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.is_empty())
    }
}
