//! Foundation - Shared value objects for the domain layer.
//!
//! Strongly-typed identifiers, timestamps, and validation errors used
//! across the conversation pipeline.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ConversationId, EventId, OrderId};
pub use timestamp::Timestamp;
