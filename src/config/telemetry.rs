//! Telemetry sink configuration

use serde::Deserialize;

/// Telemetry sink endpoints, all optional
///
/// When nothing is configured the pipeline runs with a no-op emitter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryConfig {
    /// Endpoint receiving lifecycle events
    pub event_url: Option<String>,

    /// Endpoint receiving forwarded webhook posts
    pub webhook_url: Option<String>,

    /// Endpoint receiving activity log rows
    pub log_url: Option<String>,
}

impl TelemetryConfig {
    /// True when no sink is configured at all
    pub fn is_empty(&self) -> bool {
        self.event_url.is_none() && self.webhook_url.is_none() && self.log_url.is_none()
    }
}
