//! Inbound events as normalized from the provider webhook.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, EventId, Timestamp};

/// One inbound chat event. Immutable once received; `id` is the
/// idempotency key for the dedup gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    pub id: EventId,
    pub conversation: ConversationId,
    pub payload: InboundPayload,
    pub arrived_at: Timestamp,
}

impl InboundEvent {
    pub fn new(id: EventId, conversation: ConversationId, payload: InboundPayload) -> Self {
        Self {
            id,
            conversation,
            payload,
            arrived_at: Timestamp::now(),
        }
    }

    /// Payload kind tag for audit records.
    pub fn kind(&self) -> &'static str {
        match &self.payload {
            InboundPayload::Text { .. } => "text",
            InboundPayload::Interactive { .. } => "interactive",
            InboundPayload::Media { .. } => "media",
            InboundPayload::Order { .. } => "order",
        }
    }

    /// Short human-readable preview for chat summaries and telemetry rows.
    pub fn preview(&self) -> String {
        match &self.payload {
            InboundPayload::Text { body } => body.chars().take(80).collect(),
            InboundPayload::Interactive { reply_id, title } => {
                title.clone().unwrap_or_else(|| reply_id.clone())
            }
            InboundPayload::Media { kind } => format!("[{}]", kind.as_str()),
            InboundPayload::Order { items } => format!("[order: {} item(s)]", items.len()),
        }
    }
}

/// Payload variants the pipeline routes on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundPayload {
    /// Free-text message body.
    Text { body: String },
    /// Button or list reply from an interactive message.
    Interactive {
        reply_id: String,
        title: Option<String>,
    },
    /// Any media attachment; the pipeline only acknowledges these.
    Media { kind: MediaKind },
    /// Catalog order placed through the provider's cart flow.
    Order { items: Vec<OrderItem> },
}

/// Media attachment kinds the provider delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
    Sticker,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
            MediaKind::Sticker => "sticker",
        }
    }
}

/// One line item of a catalog order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Catalog retailer id of the product.
    pub item_id: String,
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub price_minor: i64,
    pub currency: String,
}

impl OrderItem {
    /// Line total in minor currency units.
    pub fn total_minor(&self) -> i64 {
        self.price_minor * i64::from(self.quantity)
    }
}
