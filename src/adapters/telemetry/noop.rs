//! No-op telemetry emitter for deployments with no sinks configured.

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{LogRow, TelemetryEmitter};

/// Telemetry emitter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl NoopTelemetry {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TelemetryEmitter for NoopTelemetry {
    async fn emit(&self, _event: &str, _payload: Value) {}

    async fn post_webhook(&self, _event: &str, _payload: Value) {}

    async fn append_log(&self, _row: LogRow) {}
}
