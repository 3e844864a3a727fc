//! Conversation store port - relational persistence for the pipeline.
//!
//! State reads/upserts, inbound/outbound audit inserts, and the chat
//! summary the dashboard reads. The pipeline issues these as opaque calls
//! keyed by conversation id; schema and query execution live in adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{ConversationState, InboundEvent, OutboundRecord};
use crate::domain::foundation::{ConversationId, Timestamp};

/// Port for durable conversation data.
///
/// ConversationState consistency is guaranteed by the sequencer (at most
/// one writer per conversation), so implementations need no row locking
/// beyond ordinary upserts.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads the state record, `None` for a conversation never routed.
    async fn load_state(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<ConversationState>, StoreError>;

    /// Writes the full state record, inserting or replacing.
    async fn upsert_state(
        &self,
        conversation: &ConversationId,
        state: &ConversationState,
    ) -> Result<(), StoreError>;

    /// Appends an inbound audit record. Idempotent on the event id.
    async fn record_inbound(&self, event: &InboundEvent) -> Result<(), StoreError>;

    /// Appends an outbound audit record.
    async fn record_outbound(&self, record: &OutboundRecord) -> Result<(), StoreError>;

    /// True when the conversation has any recorded inbound traffic.
    async fn has_prior_inbound(&self, conversation: &ConversationId) -> Result<bool, StoreError>;

    /// Upserts the chat summary row (last message preview, activity time).
    async fn upsert_chat_summary(
        &self,
        conversation: &ConversationId,
        preview: &str,
        at: Timestamp,
    ) -> Result<(), StoreError>;
}

/// Errors from the conversation store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
