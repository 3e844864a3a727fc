//! Translator adapters.
//!
//! `PassthroughTranslator` is the default when no translation service is
//! configured; `HttpTranslator` fronts an external translate-to-English
//! endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{Translation, TranslationError, Translator};

/// Translator that returns text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl PassthroughTranslator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn to_english(&self, text: &str) -> Result<Translation, TranslationError> {
        Ok(Translation::passthrough(text))
    }
}

/// Translator fronting an external HTTP translation service.
pub struct HttpTranslator {
    endpoint: String,
    client: Client,
}

impl HttpTranslator {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| TranslationError::Unavailable(format!("Failed to build client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated: String,
    #[serde(default)]
    detected_lang: Option<String>,
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn to_english(&self, text: &str) -> Result<Translation, TranslationError> {
        let request = TranslateRequest {
            q: text,
            target: "en",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslationError::Unavailable(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::Rejected(format!(
                "status {}: {}",
                status, message
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Rejected(format!("Invalid response: {}", e)))?;

        Ok(Translation {
            translated: parsed.translated,
            detected_lang: parsed.detected_lang,
        })
    }
}

impl std::fmt::Debug for HttpTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTranslator")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
