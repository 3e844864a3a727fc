//! Telemetry emitter adapters.

mod noop;
mod webhook;

pub use noop::NoopTelemetry;
pub use webhook::{WebhookTelemetry, WebhookTelemetryConfig};
