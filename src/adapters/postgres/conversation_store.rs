//! PostgreSQL implementation of ConversationStore.
//!
//! Persists conversation state, inbound/outbound audit records, and the
//! chat summary rows the dashboard reads.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{ConversationState, InboundEvent, OutboundRecord};
use crate::domain::foundation::{ConversationId, Timestamp};
use crate::ports::{ConversationStore, StoreError};

/// PostgreSQL implementation of ConversationStore.
#[derive(Clone)]
pub struct PostgresConversationStore {
    pool: PgPool,
}

impl PostgresConversationStore {
    /// Creates a new PostgresConversationStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PostgresConversationStore {
    async fn load_state(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<ConversationState>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT flow, step, extra
            FROM conversation_states
            WHERE conversation_id = $1
            "#,
        )
        .bind(conversation.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch state: {}", e)))?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let flow: String = row.get("flow");
        let step: String = row.get("step");
        let extra_raw: String = row.get("extra");
        let extra = serde_json::from_str(&extra_raw)
            .map_err(|e| StoreError::Serialization(format!("Invalid extra map: {}", e)))?;

        Ok(Some(ConversationState { flow, step, extra }))
    }

    async fn upsert_state(
        &self,
        conversation: &ConversationId,
        state: &ConversationState,
    ) -> Result<(), StoreError> {
        let extra = serde_json::to_string(&state.extra)
            .map_err(|e| StoreError::Serialization(format!("Failed to encode extra: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO conversation_states (conversation_id, flow, step, extra, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (conversation_id) DO UPDATE SET
                flow = EXCLUDED.flow,
                step = EXCLUDED.step,
                extra = EXCLUDED.extra,
                updated_at = NOW()
            "#,
        )
        .bind(conversation.as_str())
        .bind(&state.flow)
        .bind(&state.step)
        .bind(&extra)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to upsert state: {}", e)))?;

        Ok(())
    }

    async fn record_inbound(&self, event: &InboundEvent) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&event.payload)
            .map_err(|e| StoreError::Serialization(format!("Failed to encode payload: {}", e)))?;

        // ON CONFLICT DO NOTHING keeps the insert idempotent on event id.
        sqlx::query(
            r#"
            INSERT INTO inbound_messages (event_id, conversation_id, kind, payload, arrived_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event.id.as_str())
        .bind(event.conversation.as_str())
        .bind(event.kind())
        .bind(&payload)
        .bind(*event.arrived_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to insert inbound record: {}", e)))?;

        Ok(())
    }

    async fn record_outbound(&self, record: &OutboundRecord) -> Result<(), StoreError> {
        let buttons = serde_json::to_string(&record.buttons)
            .map_err(|e| StoreError::Serialization(format!("Failed to encode buttons: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO outbound_messages (
                id, conversation_id, kind, body, buttons, gateway_message_id, sent_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.conversation.as_str())
        .bind(record.kind.as_str())
        .bind(&record.body)
        .bind(&buttons)
        .bind(record.gateway_message_id.as_deref())
        .bind(*record.sent_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to insert outbound record: {}", e)))?;

        Ok(())
    }

    async fn has_prior_inbound(&self, conversation: &ConversationId) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM inbound_messages WHERE conversation_id = $1
            ) AS present
            "#,
        )
        .bind(conversation.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to check inbound history: {}", e)))?;

        Ok(row.get::<bool, _>("present"))
    }

    async fn upsert_chat_summary(
        &self,
        conversation: &ConversationId,
        preview: &str,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO chats (conversation_id, last_message, last_activity_at, unread_count)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (conversation_id) DO UPDATE SET
                last_message = EXCLUDED.last_message,
                last_activity_at = EXCLUDED.last_activity_at,
                unread_count = chats.unread_count + 1
            "#,
        )
        .bind(conversation.as_str())
        .bind(preview)
        .bind(*at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to upsert chat summary: {}", e)))?;

        Ok(())
    }
}

impl std::fmt::Debug for PostgresConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConversationStore")
            .finish_non_exhaustive()
    }
}
