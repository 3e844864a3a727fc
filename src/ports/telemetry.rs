//! Telemetry port - best-effort lifecycle event fan-out.
//!
//! All three operations return `()`: failure handling is the
//! implementation's problem (log and move on), never the pipeline's. A
//! reply that was actually sent must not be lost from the user's
//! perspective because an observer was down.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::Timestamp;

/// Port for emitting lifecycle events to external observers.
///
/// Injected as an optional capability: when no sinks are configured the
/// pipeline is constructed with a no-op implementation.
#[async_trait]
pub trait TelemetryEmitter: Send + Sync {
    /// Broadcasts an event to the real-time stream.
    async fn emit(&self, event: &str, payload: Value);

    /// Forwards an event to the configured webhook, if any.
    async fn post_webhook(&self, event: &str, payload: Value);

    /// Appends a row to the activity log sink.
    async fn append_log(&self, row: LogRow);
}

/// One activity log row.
#[derive(Debug, Clone)]
pub struct LogRow {
    pub at: Timestamp,
    pub conversation: String,
    /// "in" or "out".
    pub direction: &'static str,
    pub summary: String,
}

impl LogRow {
    pub fn inbound(conversation: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            at: Timestamp::now(),
            conversation: conversation.into(),
            direction: "in",
            summary: summary.into(),
        }
    }

    pub fn outbound(conversation: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            at: Timestamp::now(),
            conversation: conversation.into(),
            direction: "out",
            summary: summary.into(),
        }
    }
}
