//! Send throttle - per-conversation minimum inter-send interval.
//!
//! The last-permitted-send timestamp lives in the durable TTL store with a
//! TTL longer than the throttle window, so records reliably expire between
//! legitimate gaps and no cleanup pass is needed.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{ConversationId, Timestamp};
use crate::ports::TtlStore;

/// Decides whether an outbound send for a conversation is currently
/// allowed.
pub struct SendThrottle {
    store: Arc<dyn TtlStore>,
    min_interval_ms: u64,
    record_ttl_secs: u64,
}

impl SendThrottle {
    pub fn new(store: Arc<dyn TtlStore>, min_interval_ms: u64, record_ttl_secs: u64) -> Self {
        Self {
            store,
            min_interval_ms,
            record_ttl_secs,
        }
    }

    /// Returns true and stamps "now" when the interval has elapsed;
    /// returns false and leaves the stored timestamp untouched otherwise.
    ///
    /// A store failure degrades to allowing the send; dropping replies
    /// because the throttle backend is down would punish the user twice.
    pub async fn try_acquire(&self, conversation: &ConversationId) -> bool {
        let key = Self::key(conversation);
        let now = Timestamp::now();

        match self.store.get(&key).await {
            Ok(Some(raw)) => {
                if let Ok(last) = raw.parse::<i64>() {
                    let elapsed = now.as_unix_millis() - last;
                    if elapsed >= 0 && (elapsed as u64) < self.min_interval_ms {
                        return false;
                    }
                }
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    %error,
                    conversation = %conversation,
                    "throttle store read failed, allowing send"
                );
            }
        }

        if let Err(error) = self
            .store
            .put(&key, &now.as_unix_millis().to_string(), self.record_ttl_secs)
            .await
        {
            tracing::warn!(
                %error,
                conversation = %conversation,
                "throttle store write failed"
            );
        }
        true
    }

    /// The configured minimum inter-send interval.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    fn key(conversation: &ConversationId) -> String {
        format!("throttle:{}", conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTtlStore;

    fn conversation() -> ConversationId {
        ConversationId::new("919812345678").unwrap()
    }

    #[tokio::test]
    async fn rapid_second_acquire_is_rejected() {
        let store = Arc::new(InMemoryTtlStore::new());
        let throttle = SendThrottle::new(store, 900, 60);

        assert!(throttle.try_acquire(&conversation()).await);
        assert!(!throttle.try_acquire(&conversation()).await);
    }

    #[tokio::test]
    async fn acquire_succeeds_after_the_interval() {
        let store = Arc::new(InMemoryTtlStore::new());
        // Short interval to keep the test fast; the comparison logic is
        // identical at 900 ms.
        let throttle = SendThrottle::new(store, 50, 60);
        let conv = conversation();

        assert!(throttle.try_acquire(&conv).await);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(throttle.try_acquire(&conv).await);
    }

    #[tokio::test]
    async fn rejection_leaves_stored_timestamp_untouched() {
        let store = Arc::new(InMemoryTtlStore::new());
        let throttle = SendThrottle::new(Arc::clone(&store) as Arc<dyn TtlStore>, 900, 60);
        let conv = conversation();

        assert!(throttle.try_acquire(&conv).await);
        let stamped = store.get("throttle:919812345678").await.unwrap();
        assert!(!throttle.try_acquire(&conv).await);
        let after = store.get("throttle:919812345678").await.unwrap();
        assert_eq!(stamped, after);
    }

    #[tokio::test]
    async fn conversations_are_throttled_independently() {
        let store = Arc::new(InMemoryTtlStore::new());
        let throttle = SendThrottle::new(store, 900, 60);

        assert!(throttle.try_acquire(&conversation()).await);
        assert!(
            throttle
                .try_acquire(&ConversationId::new("918700000001").unwrap())
                .await
        );
    }

    #[tokio::test]
    async fn store_outage_allows_the_send() {
        let store = Arc::new(InMemoryTtlStore::new());
        let throttle = SendThrottle::new(Arc::clone(&store) as Arc<dyn TtlStore>, 900, 60);
        store.set_unavailable(true);

        assert!(throttle.try_acquire(&conversation()).await);
        assert!(throttle.try_acquire(&conversation()).await);
    }
}
