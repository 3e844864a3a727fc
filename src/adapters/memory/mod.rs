//! In-memory adapters for testing.
//!
//! Deterministic, lock-based implementations of every port the pipeline
//! consumes, with capture and failure-injection helpers for assertions.
//!
//! # Security Note
//!
//! These adapters are for **testing only** and should not be used in
//! production. They use `.expect()` on lock operations which will panic
//! if locks are poisoned.

mod conversation_store;
mod gateway;
mod menu_provider;
mod order_repository;
mod telemetry;
mod translator;
mod ttl_store;

pub use conversation_store::InMemoryConversationStore;
pub use gateway::RecordingGateway;
pub use menu_provider::ScriptedMenuProvider;
pub use order_repository::InMemoryOrderRepository;
pub use telemetry::CapturingTelemetry;
pub use translator::FixedTranslator;
pub use ttl_store::InMemoryTtlStore;
