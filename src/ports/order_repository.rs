//! Order repository port - storefront order insert and lookup.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::Order;
use crate::domain::foundation::OrderId;

/// Port for persisted orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a newly placed order.
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// Looks an order up by id; `None` when it does not exist.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;
}

/// Errors from the order repository.
#[derive(Debug, Error)]
pub enum OrderRepositoryError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
