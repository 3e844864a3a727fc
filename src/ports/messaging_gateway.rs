//! Messaging gateway port - outbound sends to the chat provider.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::OutboundPayload;
use crate::domain::foundation::ConversationId;

/// Port for dispatching outbound messages.
///
/// Delivery is at-least-once from the provider's point of view; the
/// pipeline makes retries safe through deduplication and throttling
/// rather than expecting exactly-once semantics here.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Sends one payload to one conversation.
    ///
    /// A non-success provider response is a `GatewayError`, which the
    /// caller treats as a failed send, never as a fatal pipeline error.
    async fn send(
        &self,
        to: &ConversationId,
        payload: &OutboundPayload,
    ) -> Result<SendReceipt, GatewayError>;
}

/// Gateway acknowledgement of an accepted send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Provider-assigned message id, when one was returned.
    pub message_id: Option<String>,
}

impl SendReceipt {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
        }
    }

    /// Receipt for providers that acknowledge without an id.
    pub fn anonymous() -> Self {
        Self { message_id: None }
    }
}

/// Errors from the messaging gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider rejected the payload.
    #[error("gateway rejected send (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider could not be reached.
    #[error("gateway transport failure: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_carries_message_id() {
        let receipt = SendReceipt::new("wamid.out.42");
        assert_eq!(receipt.message_id.as_deref(), Some("wamid.out.42"));
        assert!(SendReceipt::anonymous().message_id.is_none());
    }

    #[test]
    fn rejected_error_displays_status() {
        let err = GatewayError::Rejected {
            status: 400,
            message: "bad payload".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "gateway rejected send (status 400): bad payload"
        );
    }
}
