//! PostgreSQL implementation of OrderRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{Order, OrderItem, OrderStatus, TrackingInfo};
use crate::domain::foundation::{ConversationId, OrderId, Timestamp};
use crate::ports::{OrderRepository, OrderRepositoryError as RepositoryError};

/// PostgreSQL implementation of OrderRepository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgresOrderRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let items = serde_json::to_string(&order.items)
            .map_err(|e| RepositoryError::Serialization(format!("Failed to encode items: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, conversation_id, items, total_minor, currency, status,
                tracking_carrier, tracking_number, tracking_url, placed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.conversation.as_str())
        .bind(&items)
        .bind(order.total_minor)
        .bind(&order.currency)
        .bind(order.status.as_str())
        .bind(order.tracking.as_ref().map(|t| t.carrier.as_str()))
        .bind(order.tracking.as_ref().map(|t| t.tracking_number.as_str()))
        .bind(order.tracking.as_ref().and_then(|t| t.url.as_deref()))
        .bind(*order.placed_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert order: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, conversation_id, items, total_minor, currency, status,
                   tracking_carrier, tracking_number, tracking_url, placed_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to fetch order: {}", e)))?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let id_str: String = row.get("id");
        let conversation_str: String = row.get("conversation_id");
        let items_raw: String = row.get("items");
        let total_minor: i64 = row.get("total_minor");
        let currency: String = row.get("currency");
        let status_str: String = row.get("status");
        let tracking_carrier: Option<String> = row.get("tracking_carrier");
        let tracking_number: Option<String> = row.get("tracking_number");
        let tracking_url: Option<String> = row.get("tracking_url");
        let placed_at: chrono::DateTime<chrono::Utc> = row.get("placed_at");

        let items: Vec<OrderItem> = serde_json::from_str(&items_raw)
            .map_err(|e| RepositoryError::Serialization(format!("Invalid order items: {}", e)))?;

        let status = OrderStatus::parse(&status_str).ok_or_else(|| {
            RepositoryError::Serialization(format!("Invalid order status: {}", status_str))
        })?;

        let tracking = match (tracking_carrier, tracking_number) {
            (Some(carrier), Some(tracking_number)) => Some(TrackingInfo {
                carrier,
                tracking_number,
                url: tracking_url,
            }),
            _ => None,
        };

        let order = Order {
            id: OrderId::new(id_str)
                .map_err(|e| RepositoryError::Serialization(format!("Invalid order id: {}", e)))?,
            conversation: ConversationId::new(conversation_str).map_err(|e| {
                RepositoryError::Serialization(format!("Invalid conversation id: {}", e))
            })?,
            items,
            total_minor,
            currency,
            status,
            tracking,
            placed_at: Timestamp::from_datetime(placed_at),
        };

        Ok(Some(order))
    }
}

impl std::fmt::Debug for PostgresOrderRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresOrderRepository")
            .finish_non_exhaustive()
    }
}
