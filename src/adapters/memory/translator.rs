//! Fixed-output translator for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ports::{Translation, TranslationError, Translator};

enum Script {
    Passthrough,
    Fixed {
        translated: String,
        detected_lang: String,
    },
}

/// Translator that either passes text through or returns a fixed result.
pub struct FixedTranslator {
    script: Script,
    failing: AtomicBool,
}

impl FixedTranslator {
    /// Echoes input unchanged with no detected language.
    pub fn passthrough() -> Self {
        Self {
            script: Script::Passthrough,
            failing: AtomicBool::new(false),
        }
    }

    /// Always returns `translated` with `detected_lang`, whatever the input.
    pub fn to(translated: impl Into<String>, detected_lang: impl Into<String>) -> Self {
        Self {
            script: Script::Fixed {
                translated: translated.into(),
                detected_lang: detected_lang.into(),
            },
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Translator for FixedTranslator {
    async fn to_english(&self, text: &str) -> Result<Translation, TranslationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TranslationError::Unavailable(
                "simulated outage".to_string(),
            ));
        }
        match &self.script {
            Script::Passthrough => Ok(Translation::passthrough(text)),
            Script::Fixed {
                translated,
                detected_lang,
            } => Ok(Translation {
                translated: translated.clone(),
                detected_lang: Some(detected_lang.clone()),
            }),
        }
    }
}
