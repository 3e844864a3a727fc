//! HTTP implementation of MessagingGateway for the WhatsApp Cloud API.
//!
//! Translates provider-agnostic outbound payloads into the Cloud API
//! message format and POSTs them to `{base_url}/{sender_id}/messages`
//! with bearer authentication.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::domain::conversation::{Button, OutboundPayload};
use crate::domain::foundation::ConversationId;
use crate::ports::{GatewayError, MessagingGateway, SendReceipt};

/// Configuration for the HTTP messaging gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Bearer token for the provider API.
    access_token: Secret<String>,
    /// Provider-assigned sender (phone number) id.
    pub sender_id: String,
    /// Base URL of the provider API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpGatewayConfig {
    /// Creates a new configuration with the given access token.
    pub fn new(access_token: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            sender_id: sender_id.into(),
            base_url: "https://graph.facebook.com/v19.0".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// HTTP messaging gateway for production deployments.
pub struct HttpMessagingGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpMessagingGateway {
    /// Creates a new gateway with the given configuration.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to build client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.config.base_url, self.config.sender_id)
    }
}

#[async_trait]
impl MessagingGateway for HttpMessagingGateway {
    async fn send(
        &self,
        to: &ConversationId,
        payload: &OutboundPayload,
    ) -> Result<SendReceipt, GatewayError> {
        let body = wire_message(to, payload);

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(self.config.access_token())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("Send failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SendResponse = match response.json().await {
            Ok(parsed) => parsed,
            // Acknowledged without a parseable body; the send still happened.
            Err(_) => return Ok(SendReceipt::anonymous()),
        };

        match parsed.messages.into_iter().next() {
            Some(msg) => Ok(SendReceipt::new(msg.id)),
            None => Ok(SendReceipt::anonymous()),
        }
    }
}

impl std::fmt::Debug for HttpMessagingGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMessagingGateway")
            .field("sender_id", &self.config.sender_id)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Builds the Cloud API message object for one payload.
fn wire_message(to: &ConversationId, payload: &OutboundPayload) -> Value {
    let mut message = json!({
        "messaging_product": "whatsapp",
        "to": to.as_str(),
    });

    let body = match payload {
        OutboundPayload::Text { body } => json!({
            "type": "text",
            "text": { "body": body },
        }),
        OutboundPayload::Buttons { body, buttons } => json!({
            "type": "interactive",
            "interactive": {
                "type": "button",
                "body": { "text": body },
                "action": { "buttons": wire_buttons(buttons) },
            },
        }),
        OutboundPayload::List {
            body,
            button_label,
            rows,
        } => json!({
            "type": "interactive",
            "interactive": {
                "type": "list",
                "body": { "text": body },
                "action": {
                    "button": button_label,
                    "sections": [{
                        "rows": rows.iter().map(|row| json!({
                            "id": row.id,
                            "title": row.title,
                        })).collect::<Vec<_>>(),
                    }],
                },
            },
        }),
        OutboundPayload::Media {
            media_kind,
            url,
            caption,
        } => {
            let kind = media_kind.as_str();
            let mut media = json!({ "link": url });
            if let Some(caption) = caption {
                media["caption"] = json!(caption);
            }
            json!({ "type": kind, kind: media })
        }
        OutboundPayload::Template { name, params } => json!({
            "type": "template",
            "template": {
                "name": name,
                "language": { "code": "en" },
                "components": [{
                    "type": "body",
                    "parameters": params.iter().map(|p| json!({
                        "type": "text",
                        "text": p,
                    })).collect::<Vec<_>>(),
                }],
            },
        }),
        OutboundPayload::OrderConfirmation { body, .. } => json!({
            "type": "text",
            "text": { "body": body },
        }),
    };

    if let (Value::Object(message_map), Value::Object(body_map)) = (&mut message, body) {
        message_map.extend(body_map);
    }
    message
}

fn wire_buttons(buttons: &[Button]) -> Vec<Value> {
    buttons
        .iter()
        .map(|button| {
            json!({
                "type": "reply",
                "reply": { "id": button.id, "title": button.title },
            })
        })
        .collect()
}

#[derive(Debug, Deserialize, Serialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize, Serialize)]
struct SentMessage {
    id: String,
}
