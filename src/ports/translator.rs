//! Translator port - optional text translation capability.
//!
//! Absence of a real translation service is a valid configuration: the
//! pipeline is constructed with a pass-through implementation instead of
//! feature-detecting at call sites.

use async_trait::async_trait;
use thiserror::Error;

/// Port for translating inbound text to English before keyword matching.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` to English, reporting the detected source
    /// language when the service knows it.
    async fn to_english(&self, text: &str) -> Result<Translation, TranslationError>;
}

/// Result of a translation pass.
#[derive(Debug, Clone)]
pub struct Translation {
    pub translated: String,
    /// ISO language code of the detected source, if any.
    pub detected_lang: Option<String>,
}

impl Translation {
    /// Pass-through translation: text unchanged, no detected language.
    pub fn passthrough(text: &str) -> Self {
        Self {
            translated: text.to_string(),
            detected_lang: None,
        }
    }
}

/// Errors from the translation service.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation service unavailable: {0}")]
    Unavailable(String),

    #[error("translation service rejected input: {0}")]
    Rejected(String),
}
