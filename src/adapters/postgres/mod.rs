//! PostgreSQL adapters.
//!
//! Production implementations of the conversation store and order
//! repository ports, backed by sqlx.

mod conversation_store;
mod order_repository;

pub use conversation_store::PostgresConversationStore;
pub use order_repository::PostgresOrderRepository;
