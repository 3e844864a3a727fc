//! Dedup gate - idempotent rejection of redelivered inbound events.
//!
//! A bounded local cache answers the common case without a round trip;
//! the durable TTL store stays authoritative across restarts and across
//! processes. Both layers are claim-based: the local claim is an insert
//! under one lock section, the durable claim a conditional write, so of
//! any number of concurrent deliveries of one id exactly one is admitted.
//! The dedup window matches the worst-case upstream redelivery window.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::foundation::EventId;
use crate::ports::TtlStore;

/// Decides whether an inbound event was already processed.
///
/// Side effecting: the first call for an id marks it seen in both the
/// local cache and the durable store.
pub struct DedupGate {
    store: Arc<dyn TtlStore>,
    window_secs: u64,
    capacity: usize,
    seen: Mutex<SeenCache>,
}

struct SeenCache {
    ids: HashSet<String>,
    order: VecDeque<String>,
}

impl DedupGate {
    pub fn new(store: Arc<dyn TtlStore>, window_secs: u64, capacity: usize) -> Self {
        Self {
            store,
            window_secs,
            capacity: capacity.max(2),
            seen: Mutex::new(SeenCache {
                ids: HashSet::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Returns true when the event was seen before, marking it seen
    /// otherwise.
    ///
    /// The local claim is atomic, so two in-process deliveries racing on
    /// one id resolve before any store round trip. The durable claim is a
    /// conditional write, which settles races against other processes and
    /// against locally evicted ids. A store failure degrades to the local
    /// cache: an event not found locally is treated as new, favoring
    /// at-least-once delivery over a silent drop.
    pub async fn is_duplicate(&self, id: &EventId) -> bool {
        let key = Self::key(id);

        if !self.claim_local(&key) {
            return true;
        }

        match self.store.put_if_absent(&key, "1", self.window_secs).await {
            Ok(claimed) => !claimed,
            Err(error) => {
                tracing::warn!(
                    %error,
                    event_id = %id,
                    "dedup store claim failed, relying on local cache only"
                );
                false
            }
        }
    }

    fn key(id: &EventId) -> String {
        format!("dedup:{}", id)
    }

    fn cache(&self) -> MutexGuard<'_, SeenCache> {
        // Recover from a poisoned lock: the cache holds plain strings and
        // stays internally consistent even if a holder panicked.
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Inserts the key into the local cache; false when it was already
    /// there. Check and insert share one lock section, so concurrent
    /// claims for one key yield exactly one winner.
    fn claim_local(&self, key: &str) -> bool {
        let mut cache = self.cache();
        if !cache.ids.insert(key.to_string()) {
            return false;
        }
        cache.order.push_back(key.to_string());
        if cache.ids.len() > self.capacity {
            // Evict the oldest half. The durable store remains
            // authoritative, so eviction can never cause a false negative.
            let evict = cache.order.len() / 2;
            for _ in 0..evict {
                if let Some(old) = cache.order.pop_front() {
                    cache.ids.remove(&old);
                }
            }
        }
        true
    }

    /// Number of locally cached ids (test observability).
    #[cfg(test)]
    fn cached_len(&self) -> usize {
        self.cache().ids.len()
    }
}
