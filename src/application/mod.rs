//! Application layer - the conversation processing pipeline.
//!
//! Inbound control flow: dedup gate -> sequencer enqueue -> (inside the
//! single-flight slot) send throttle -> deadline-guarded action router ->
//! outcome. Each component lives in its own module and is constructed with
//! explicit dependencies; there are no process-wide singletons.

mod deadline;
mod dedup;
mod error;
mod inquiry;
mod pipeline;
mod router;
mod sequencer;
mod throttle;

pub use deadline::{with_deadline, DeadlineError, DEFAULT_ROUTING_DEADLINE};
pub use dedup::DedupGate;
pub use error::RoutingError;
pub use inquiry::{status_reply, ORDER_NOT_FOUND_NOTICE};
pub use pipeline::{
    EventOutcome, MessagePipeline, PipelineSettings, FALLBACK_NOTICE, SLOW_DOWN_NOTICE,
};
pub use router::{ActionRouter, MEDIA_ACK_NOTICE};
pub use sequencer::ConversationSequencer;
pub use throttle::SendThrottle;
