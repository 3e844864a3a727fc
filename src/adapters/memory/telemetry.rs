//! Capturing telemetry emitter for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::RwLock;

use crate::ports::{LogRow, TelemetryEmitter};

/// Telemetry emitter that captures everything for assertions.
pub struct CapturingTelemetry {
    events: RwLock<Vec<(String, Value)>>,
    webhooks: RwLock<Vec<(String, Value)>>,
    logs: RwLock<Vec<LogRow>>,
}

impl CapturingTelemetry {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            webhooks: RwLock::new(Vec::new()),
            logs: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    pub fn has_event(&self, name: &str) -> bool {
        self.events
            .read()
            .expect("events lock poisoned")
            .iter()
            .any(|(event, _)| event == name)
    }

    pub fn event_count(&self, name: &str) -> usize {
        self.events
            .read()
            .expect("events lock poisoned")
            .iter()
            .filter(|(event, _)| event == name)
            .count()
    }

    pub fn webhook_count(&self) -> usize {
        self.webhooks.read().expect("webhooks lock poisoned").len()
    }

    pub fn log_count(&self) -> usize {
        self.logs.read().expect("logs lock poisoned").len()
    }

    pub fn log_rows(&self) -> Vec<LogRow> {
        self.logs.read().expect("logs lock poisoned").clone()
    }
}

impl Default for CapturingTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetryEmitter for CapturingTelemetry {
    async fn emit(&self, event: &str, payload: Value) {
        self.events
            .write()
            .expect("events lock poisoned")
            .push((event.to_string(), payload));
    }

    async fn post_webhook(&self, event: &str, payload: Value) {
        self.webhooks
            .write()
            .expect("webhooks lock poisoned")
            .push((event.to_string(), payload));
    }

    async fn append_log(&self, row: LogRow) {
        self.logs.write().expect("logs lock poisoned").push(row);
    }
}
