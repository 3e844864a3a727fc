//! Conversation domain - state machine, inbound events, actions, orders.
//!
//! Everything here is pure data and logic; the application layer drives it
//! and the adapters persist it.

mod action;
mod event;
mod order;
mod outbound;
mod state;

pub use action::{normalize_input, Action, ContentKind, RouteDescriptor, RouteEffect};
pub use event::{InboundEvent, InboundPayload, MediaKind, OrderItem};
pub use order::{Order, OrderStatus, TrackingInfo};
pub use outbound::{Button, OutboundKind, OutboundPayload, OutboundRecord};
pub use state::{ConversationState, StateUpdate};
