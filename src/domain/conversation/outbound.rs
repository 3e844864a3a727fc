//! Outbound payloads and the audit record written for each send.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{ConversationId, OrderId, Timestamp};

use super::event::MediaKind;

/// Payload kinds the messaging gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundKind {
    Text,
    Buttons,
    List,
    Media,
    Template,
    OrderConfirmation,
}

impl OutboundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboundKind::Text => "text",
            OutboundKind::Buttons => "buttons",
            OutboundKind::List => "list",
            OutboundKind::Media => "media",
            OutboundKind::Template => "template",
            OutboundKind::OrderConfirmation => "order_confirmation",
        }
    }
}

/// One tappable button on an interactive message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub title: String,
}

impl Button {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Outbound message payload, provider-format agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundPayload {
    Text {
        body: String,
    },
    Buttons {
        body: String,
        buttons: Vec<Button>,
    },
    List {
        body: String,
        button_label: String,
        rows: Vec<Button>,
    },
    Media {
        media_kind: MediaKind,
        url: String,
        caption: Option<String>,
    },
    Template {
        name: String,
        params: Vec<String>,
    },
    OrderConfirmation {
        order_id: OrderId,
        body: String,
    },
}

impl OutboundPayload {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundPayload::Text { body: body.into() }
    }

    pub fn kind(&self) -> OutboundKind {
        match self {
            OutboundPayload::Text { .. } => OutboundKind::Text,
            OutboundPayload::Buttons { .. } => OutboundKind::Buttons,
            OutboundPayload::List { .. } => OutboundKind::List,
            OutboundPayload::Media { .. } => OutboundKind::Media,
            OutboundPayload::Template { .. } => OutboundKind::Template,
            OutboundPayload::OrderConfirmation { .. } => OutboundKind::OrderConfirmation,
        }
    }

    /// Body text for the audit record.
    pub fn body(&self) -> &str {
        match self {
            OutboundPayload::Text { body } => body,
            OutboundPayload::Buttons { body, .. } => body,
            OutboundPayload::List { body, .. } => body,
            OutboundPayload::Media { caption, .. } => caption.as_deref().unwrap_or(""),
            OutboundPayload::Template { name, .. } => name,
            OutboundPayload::OrderConfirmation { body, .. } => body,
        }
    }

    /// Button titles for the audit record, empty when not interactive.
    pub fn button_titles(&self) -> Vec<String> {
        match self {
            OutboundPayload::Buttons { buttons, .. } => {
                buttons.iter().map(|b| b.title.clone()).collect()
            }
            OutboundPayload::List { rows, .. } => rows.iter().map(|b| b.title.clone()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Audit record of one message that reached the gateway.
///
/// Written once per send attempt; losing the write never rolls back the
/// reply the user already received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundRecord {
    pub id: Uuid,
    pub conversation: ConversationId,
    pub kind: OutboundKind,
    pub body: String,
    pub buttons: Vec<String>,
    /// Gateway-assigned message id, when the gateway returned one.
    pub gateway_message_id: Option<String>,
    pub sent_at: Timestamp,
}

impl OutboundRecord {
    /// Builds the audit record for a payload that was just sent.
    pub fn from_send(
        conversation: ConversationId,
        payload: &OutboundPayload,
        gateway_message_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation,
            kind: payload.kind(),
            body: payload.body().to_string(),
            buttons: payload.button_titles(),
            gateway_message_id,
            sent_at: Timestamp::now(),
        }
    }
}
