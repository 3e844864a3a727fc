//! Recording messaging gateway for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::domain::conversation::OutboundPayload;
use crate::domain::foundation::ConversationId;
use crate::ports::{GatewayError, MessagingGateway, SendReceipt};

/// Gateway that records every send for assertions.
///
/// Supports an artificial per-send delay (deadline tests) and simulated
/// transport failures.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned; acceptable for test
/// code only.
pub struct RecordingGateway {
    sent: RwLock<Vec<(ConversationId, OutboundPayload)>>,
    delay: RwLock<Option<Duration>>,
    failing: AtomicBool,
    counter: AtomicU64,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            delay: RwLock::new(None),
            failing: AtomicBool::new(false),
            counter: AtomicU64::new(0),
        }
    }

    /// Delays every subsequent send by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().expect("delay lock poisoned") = delay;
    }

    /// Makes every subsequent send fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    // === Test Helpers ===

    pub fn sent_count(&self) -> usize {
        self.sent.read().expect("sent lock poisoned").len()
    }

    pub fn sent_payloads(&self) -> Vec<(ConversationId, OutboundPayload)> {
        self.sent.read().expect("sent lock poisoned").clone()
    }

    /// Body text of each send, in order.
    pub fn bodies(&self) -> Vec<String> {
        self.sent
            .read()
            .expect("sent lock poisoned")
            .iter()
            .map(|(_, payload)| payload.body().to_string())
            .collect()
    }

    pub fn sends_to(&self, conversation: &ConversationId) -> usize {
        self.sent
            .read()
            .expect("sent lock poisoned")
            .iter()
            .filter(|(to, _)| to == conversation)
            .count()
    }
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send(
        &self,
        to: &ConversationId,
        payload: &OutboundPayload,
    ) -> Result<SendReceipt, GatewayError> {
        let delay = *self.delay.read().expect("delay lock poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("simulated outage".to_string()));
        }
        self.sent
            .write()
            .expect("sent lock poisoned")
            .push((to.clone(), payload.clone()));
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(SendReceipt::new(format!("out-{n}")))
    }
}
