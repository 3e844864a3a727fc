//! TTL store port - key-value storage with expiry.
//!
//! Backs the dedup gate (seen event ids) and the send throttle
//! (last-permitted-send timestamps). Keys are scoped per conversation or
//! per message, so no cross-key coordination is required; the conditional
//! write gives key-scoped first-writer-wins under concurrent claims.

use async_trait::async_trait;
use thiserror::Error;

/// Port for durable, expiring key-value entries.
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Reads a value; `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, TtlStoreError>;

    /// Writes a value with the given time-to-live.
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TtlStoreError>;

    /// Writes a value only when the key is absent (or expired).
    ///
    /// Returns true when this call claimed the key, false when another
    /// writer already holds it. Atomic per key: of any number of
    /// concurrent claims, exactly one returns true.
    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<bool, TtlStoreError>;
}

/// Errors from the TTL store.
///
/// Callers degrade rather than fail: the dedup gate and throttle both
/// log and fall back to their permissive path when the store is down.
#[derive(Debug, Error)]
pub enum TtlStoreError {
    #[error("ttl store unavailable: {0}")]
    Unavailable(String),
}
