//! Redis-backed TTL store implementation for production deployments.
//!
//! Uses plain GET / SETEX plus SET NX EX for conditional claims; expiry is
//! Redis-native, so entries disappear without any sweeper. Suitable for
//! multi-server deployments where the dedup window and throttle records
//! must be shared.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::ports::{TtlStore, TtlStoreError};

/// Redis-backed TTL store for production multi-server deployments.
#[derive(Clone)]
pub struct RedisTtlStore {
    conn: MultiplexedConnection,
}

impl RedisTtlStore {
    /// Create a store over an existing multiplexed connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Connect to Redis and create a store.
    pub async fn connect(url: &str) -> Result<Self, TtlStoreError> {
        let client =
            redis::Client::open(url).map_err(|e| TtlStoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| TtlStoreError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl TtlStore for RedisTtlStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TtlStoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e: redis::RedisError| TtlStoreError::Unavailable(e.to_string()))?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TtlStoreError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e: redis::RedisError| TtlStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<bool, TtlStoreError> {
        let mut conn = self.conn.clone();
        // SET NX EX is a single atomic claim; replies OK when written,
        // Nil when the key already exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| TtlStoreError::Unavailable(e.to_string()))?;
        Ok(reply.is_some())
    }
}

impl std::fmt::Debug for RedisTtlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTtlStore").finish_non_exhaustive()
    }
}
