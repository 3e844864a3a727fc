//! In-memory conversation store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::conversation::{ConversationState, InboundEvent, OutboundRecord};
use crate::domain::foundation::{ConversationId, Timestamp};
use crate::ports::{ConversationStore, StoreError};

/// In-memory conversation store with failure injection on writes.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned; acceptable for test
/// code only.
pub struct InMemoryConversationStore {
    states: RwLock<HashMap<ConversationId, ConversationState>>,
    inbound: RwLock<Vec<InboundEvent>>,
    outbound: RwLock<Vec<OutboundRecord>>,
    summaries: RwLock<HashMap<ConversationId, Summary>>,
    failing_writes: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub preview: String,
    pub at: Timestamp,
    pub unread: u32,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            inbound: RwLock::new(Vec::new()),
            outbound: RwLock::new(Vec::new()),
            summaries: RwLock::new(HashMap::new()),
            failing_writes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent write fail; reads keep working.
    pub fn fail_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    // === Test Helpers ===

    pub fn state_of(&self, conversation: &ConversationId) -> Option<ConversationState> {
        self.states
            .read()
            .expect("states lock poisoned")
            .get(conversation)
            .cloned()
    }

    pub fn inbound_count(&self) -> usize {
        self.inbound.read().expect("inbound lock poisoned").len()
    }

    pub fn outbound_records(&self) -> Vec<OutboundRecord> {
        self.outbound
            .read()
            .expect("outbound lock poisoned")
            .clone()
    }

    pub fn summary_of(&self, conversation: &ConversationId) -> Option<Summary> {
        self.summaries
            .read()
            .expect("summaries lock poisoned")
            .get(conversation)
            .cloned()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("simulated write failure".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load_state(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<ConversationState>, StoreError> {
        Ok(self.state_of(conversation))
    }

    async fn upsert_state(
        &self,
        conversation: &ConversationId,
        state: &ConversationState,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        self.states
            .write()
            .expect("states lock poisoned")
            .insert(conversation.clone(), state.clone());
        Ok(())
    }

    async fn record_inbound(&self, event: &InboundEvent) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut inbound = self.inbound.write().expect("inbound lock poisoned");
        // Idempotent on the event id, matching the unique index the
        // relational store enforces.
        if inbound.iter().any(|e| e.id == event.id) {
            return Ok(());
        }
        inbound.push(event.clone());
        Ok(())
    }

    async fn record_outbound(&self, record: &OutboundRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.outbound
            .write()
            .expect("outbound lock poisoned")
            .push(record.clone());
        Ok(())
    }

    async fn has_prior_inbound(&self, conversation: &ConversationId) -> Result<bool, StoreError> {
        Ok(self
            .inbound
            .read()
            .expect("inbound lock poisoned")
            .iter()
            .any(|e| &e.conversation == conversation))
    }

    async fn upsert_chat_summary(
        &self,
        conversation: &ConversationId,
        preview: &str,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut summaries = self.summaries.write().expect("summaries lock poisoned");
        let entry = summaries.entry(conversation.clone()).or_insert(Summary {
            preview: String::new(),
            at,
            unread: 0,
        });
        entry.preview = preview.to_string();
        entry.at = at;
        entry.unread += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::InboundPayload;
    use crate::domain::foundation::EventId;

    fn conv() -> ConversationId {
        ConversationId::new("919812345678").unwrap()
    }

    fn event(id: &str) -> InboundEvent {
        InboundEvent::new(
            EventId::new(id).unwrap(),
            conv(),
            InboundPayload::Text {
                body: "hello".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn record_inbound_is_idempotent_on_event_id() {
        let store = InMemoryConversationStore::new();
        store.record_inbound(&event("wamid.1")).await.unwrap();
        store.record_inbound(&event("wamid.1")).await.unwrap();
        assert_eq!(store.inbound_count(), 1);
    }

    #[tokio::test]
    async fn has_prior_inbound_reflects_recorded_traffic() {
        let store = InMemoryConversationStore::new();
        assert!(!store.has_prior_inbound(&conv()).await.unwrap());
        store.record_inbound(&event("wamid.2")).await.unwrap();
        assert!(store.has_prior_inbound(&conv()).await.unwrap());
    }

    #[tokio::test]
    async fn chat_summary_counts_unread() {
        let store = InMemoryConversationStore::new();
        let now = Timestamp::now();
        store.upsert_chat_summary(&conv(), "hi", now).await.unwrap();
        store.upsert_chat_summary(&conv(), "again", now).await.unwrap();

        let summary = store.summary_of(&conv()).unwrap();
        assert_eq!(summary.preview, "again");
        assert_eq!(summary.unread, 2);
    }

    #[tokio::test]
    async fn failing_writes_leave_reads_working() {
        let store = InMemoryConversationStore::new();
        store.record_inbound(&event("wamid.3")).await.unwrap();
        store.fail_writes(true);

        assert!(store.record_inbound(&event("wamid.4")).await.is_err());
        assert!(store.has_prior_inbound(&conv()).await.unwrap());
    }
}
