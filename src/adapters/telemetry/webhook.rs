//! Webhook-backed telemetry emitter.
//!
//! Forwards lifecycle events and activity log rows to HTTP endpoints.
//! Every failure is logged and swallowed: observers being down must
//! never cost a user their reply.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::ports::{LogRow, TelemetryEmitter};

/// Configuration for the webhook telemetry emitter.
#[derive(Debug, Clone, Default)]
pub struct WebhookTelemetryConfig {
    /// Endpoint receiving lifecycle events, if any.
    pub event_url: Option<String>,
    /// Endpoint receiving forwarded webhook posts, if any.
    pub webhook_url: Option<String>,
    /// Endpoint receiving activity log rows, if any.
    pub log_url: Option<String>,
}

impl WebhookTelemetryConfig {
    /// True when no endpoint is configured at all.
    pub fn is_empty(&self) -> bool {
        self.event_url.is_none() && self.webhook_url.is_none() && self.log_url.is_none()
    }
}

/// Telemetry emitter posting to configured HTTP endpoints.
pub struct WebhookTelemetry {
    config: WebhookTelemetryConfig,
    client: Client,
}

impl WebhookTelemetry {
    pub fn new(config: WebhookTelemetryConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    async fn post(&self, url: &str, body: &Value) {
        match self.client.post(url).json(body).send().await {
            Ok(response) if !response.status().is_success() => {
                debug!(url, status = %response.status(), "telemetry endpoint rejected post");
            }
            Ok(_) => {}
            Err(e) => {
                debug!(url, error = %e, "telemetry post failed");
            }
        }
    }
}

#[async_trait]
impl TelemetryEmitter for WebhookTelemetry {
    async fn emit(&self, event: &str, payload: Value) {
        if let Some(url) = &self.config.event_url {
            let body = json!({ "event": event, "payload": payload });
            self.post(url, &body).await;
        }
    }

    async fn post_webhook(&self, event: &str, payload: Value) {
        if let Some(url) = &self.config.webhook_url {
            let body = json!({ "event": event, "payload": payload });
            self.post(url, &body).await;
        }
    }

    async fn append_log(&self, row: LogRow) {
        if let Some(url) = &self.config.log_url {
            let body = json!({
                "at": row.at.as_unix_millis(),
                "conversation": row.conversation,
                "direction": row.direction,
                "summary": row.summary,
            });
            self.post(url, &body).await;
        }
    }
}

impl std::fmt::Debug for WebhookTelemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookTelemetry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
