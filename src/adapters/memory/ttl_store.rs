//! In-memory TTL store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::{TtlStore, TtlStoreError};

/// In-memory TTL store with simulated outages.
///
/// Expiry is checked on read against wall-clock time; no background
/// sweeper is needed for tests.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned; acceptable for test
/// code only.
pub struct InMemoryTtlStore {
    entries: RwLock<HashMap<String, Entry>>,
    unavailable: AtomicBool,
    delay: RwLock<Option<Duration>>,
}

struct Entry {
    value: String,
    expires_at: Timestamp,
}

impl InMemoryTtlStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
            delay: RwLock::new(None),
        }
    }

    /// Makes every subsequent call fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Adds an artificial latency to every call, for tests that need a
    /// window to interleave concurrent callers.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().expect("ttl store lock poisoned") = delay;
    }

    async fn simulate_latency(&self) {
        let delay = *self.delay.read().expect("ttl store lock poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Number of stored entries, expired or not (test assertions).
    pub fn len(&self) -> usize {
        self.entries.read().expect("ttl store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), TtlStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TtlStoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryTtlStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtlStore for InMemoryTtlStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TtlStoreError> {
        self.check_available()?;
        self.simulate_latency().await;
        let entries = self.entries.read().expect("ttl store lock poisoned");
        Ok(entries.get(key).and_then(|entry| {
            if entry.expires_at.is_after(&Timestamp::now()) {
                Some(entry.value.clone())
            } else {
                None
            }
        }))
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TtlStoreError> {
        self.check_available()?;
        self.simulate_latency().await;
        let mut entries = self.entries.write().expect("ttl store lock poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Timestamp::now().plus_millis(ttl_secs as i64 * 1000),
            },
        );
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<bool, TtlStoreError> {
        self.check_available()?;
        self.simulate_latency().await;
        let mut entries = self.entries.write().expect("ttl store lock poisoned");
        // Check and insert under one write lock so concurrent claims
        // resolve to exactly one winner.
        let now = Timestamp::now();
        if let Some(existing) = entries.get(key) {
            if existing.expires_at.is_after(&now) {
                return Ok(false);
            }
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now.plus_millis(ttl_secs as i64 * 1000),
            },
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryTtlStore::new();
        store.put("k", "v", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let store = InMemoryTtlStore::new();
        store.put("k", "v", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn outage_fails_every_operation() {
        let store = InMemoryTtlStore::new();
        store.set_unavailable(true);
        assert!(store.get("k").await.is_err());
        assert!(store.put("k", "v", 1).await.is_err());
        assert!(store.put_if_absent("k", "v", 1).await.is_err());
    }

    #[tokio::test]
    async fn conditional_put_claims_once() {
        let store = InMemoryTtlStore::new();
        assert!(store.put_if_absent("k", "first", 60).await.unwrap());
        assert!(!store.put_if_absent("k", "second", 60).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn conditional_put_reclaims_expired_key() {
        let store = InMemoryTtlStore::new();
        assert!(store.put_if_absent("k", "first", 0).await.unwrap());
        assert!(store.put_if_absent("k", "second", 60).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
    }
}
