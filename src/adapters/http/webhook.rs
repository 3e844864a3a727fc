//! Webhook ingress handlers.
//!
//! `GET /webhook` answers the provider's subscription handshake;
//! `POST /webhook` verifies the payload signature, normalizes the
//! envelope into inbound events, and hands them to the pipeline in the
//! background so the provider gets its 200 immediately.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use secrecy::Secret;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::MessagePipeline;
use crate::domain::conversation::{InboundEvent, InboundPayload, MediaKind, OrderItem};
use crate::domain::foundation::{ConversationId, EventId};

use super::signature::verify_signature;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub pipeline: Arc<MessagePipeline>,
    pub app_secret: Secret<String>,
    pub verify_token: String,
}

/// Create the webhook router.
pub fn webhook_routes() -> Router<WebhookState> {
    Router::new()
        .route("/webhook", get(verify_subscription))
        .route("/webhook", post(receive_events))
}

/// Handles the provider's subscription handshake.
async fn verify_subscription(
    State(state): State<WebhookState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    match handshake_challenge(&params, &state.verify_token) {
        Some(challenge) => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge)
        }
        None => {
            warn!("webhook handshake rejected");
            (StatusCode::FORBIDDEN, String::new())
        }
    }
}

/// Returns the challenge to echo when the handshake is valid.
fn handshake_challenge(params: &HashMap<String, String>, verify_token: &str) -> Option<String> {
    let mode = params.get("hub.mode")?;
    let token = params.get("hub.verify_token")?;
    let challenge = params.get("hub.challenge")?;
    if mode == "subscribe" && token == verify_token {
        Some(challenge.clone())
    } else {
        None
    }
}

/// Handles an inbound event delivery.
async fn receive_events(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok());
    if let Err(e) = verify_signature(&state.app_secret, &body, header) {
        warn!(error = %e, "rejected webhook delivery");
        return StatusCode::UNAUTHORIZED;
    }

    let events = match parse_events(&body) {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "unparseable webhook envelope");
            // Acknowledge anyway so the provider does not retry forever.
            return StatusCode::OK;
        }
    };

    if !events.is_empty() {
        let pipeline = Arc::clone(&state.pipeline);
        // The provider expects a fast 200; processing happens behind it.
        tokio::spawn(async move {
            pipeline.process_batch(events).await;
        });
    }

    StatusCode::OK
}

/// Normalizes a provider envelope into inbound events.
///
/// Individual malformed messages are skipped with a warning; only an
/// envelope that fails to parse at all is an error.
fn parse_events(body: &[u8]) -> Result<Vec<InboundEvent>, serde_json::Error> {
    let envelope: Envelope = serde_json::from_slice(body)?;

    let mut events = Vec::new();
    for entry in envelope.entry {
        for change in entry.changes {
            for message in change.value.messages {
                match into_event(message) {
                    Some(event) => events.push(event),
                    None => warn!("skipped malformed inbound message"),
                }
            }
        }
    }
    Ok(events)
}

fn into_event(message: WireMessage) -> Option<InboundEvent> {
    let id = EventId::new(message.id).ok()?;
    let conversation = ConversationId::new(message.from).ok()?;

    let payload = match message.kind.as_str() {
        "text" => InboundPayload::Text {
            body: message.text?.body,
        },
        "interactive" => {
            let interactive = message.interactive?;
            let reply = interactive.button_reply.or(interactive.list_reply)?;
            InboundPayload::Interactive {
                reply_id: reply.id,
                title: reply.title,
            }
        }
        "order" => InboundPayload::Order {
            items: message
                .order?
                .product_items
                .into_iter()
                .map(|item| OrderItem {
                    item_id: item.product_retailer_id,
                    quantity: item.quantity,
                    price_minor: (item.item_price * 100.0).round() as i64,
                    currency: item.currency,
                })
                .collect(),
        },
        other => InboundPayload::Media {
            kind: media_kind(other)?,
        },
    };

    Some(InboundEvent::new(id, conversation, payload))
}

fn media_kind(raw: &str) -> Option<MediaKind> {
    match raw {
        "image" => Some(MediaKind::Image),
        "video" => Some(MediaKind::Video),
        "audio" => Some(MediaKind::Audio),
        "document" => Some(MediaKind::Document),
        "sticker" => Some(MediaKind::Sticker),
        _ => None,
    }
}

// === Wire Types ===

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    value: ChangeValue,
}

#[derive(Debug, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
    from: String,
    #[serde(rename = "type")]
    kind: String,
    text: Option<WireText>,
    interactive: Option<WireInteractive>,
    order: Option<WireOrder>,
}

#[derive(Debug, Deserialize)]
struct WireText {
    body: String,
}

#[derive(Debug, Deserialize)]
struct WireInteractive {
    button_reply: Option<WireReply>,
    list_reply: Option<WireReply>,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    id: String,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireOrder {
    #[serde(default)]
    product_items: Vec<WireOrderItem>,
}

#[derive(Debug, Deserialize)]
struct WireOrderItem {
    product_retailer_id: String,
    quantity: u32,
    item_price: f64,
    currency: String,
}
