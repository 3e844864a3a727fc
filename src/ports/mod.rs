//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! pipeline and the outside world. Adapters implement these ports.
//!
//! ## Collaborators
//!
//! - `MessagingGateway` - outbound sends to the chat provider
//! - `ConversationStore` - relational persistence of state and audit records
//! - `OrderRepository` - storefront order insert/lookup
//! - `TtlStore` - key-value store with expiry, backing dedup and throttling
//! - `Translator` - optional text translation capability
//! - `TelemetryEmitter` - optional best-effort lifecycle event fan-out
//! - `MenuProvider` - menu/content descriptors for a conversation

mod conversation_store;
mod menu_provider;
mod messaging_gateway;
mod order_repository;
mod telemetry;
mod translator;
mod ttl_store;

pub use conversation_store::{ConversationStore, StoreError};
pub use menu_provider::{MenuError, MenuProvider};
pub use messaging_gateway::{GatewayError, MessagingGateway, SendReceipt};
pub use order_repository::{OrderRepository, OrderRepositoryError};
pub use telemetry::{LogRow, TelemetryEmitter};
pub use translator::{Translation, TranslationError, Translator};
pub use ttl_store::{TtlStore, TtlStoreError};
