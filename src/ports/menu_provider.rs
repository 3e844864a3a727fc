//! Menu provider port - menu and content descriptors per conversation.
//!
//! Menu copy, button layout, and localization live behind this port; the
//! pipeline only forwards the returned payload to the gateway and links
//! the gateway message id into the audit trail.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::OutboundPayload;
use crate::domain::foundation::ConversationId;

/// Port for resolving a named menu into a sendable payload.
#[async_trait]
pub trait MenuProvider: Send + Sync {
    /// Returns the payload for `menu`, localized for `language` when the
    /// provider supports it.
    async fn menu(
        &self,
        conversation: &ConversationId,
        language: Option<&str>,
        menu: &str,
    ) -> Result<OutboundPayload, MenuError>;
}

/// Errors from the menu provider.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("unknown menu: {0}")]
    UnknownMenu(String),

    #[error("menu provider unavailable: {0}")]
    Unavailable(String),
}
