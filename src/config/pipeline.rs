//! Pipeline tunables

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::PipelineSettings;

/// Pipeline tunables, all optional with production defaults
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Dedup window in seconds
    #[serde(default = "default_dedup_window")]
    pub dedup_window_secs: u64,

    /// Local dedup cache capacity
    #[serde(default = "default_dedup_cache_capacity")]
    pub dedup_cache_capacity: usize,

    /// Minimum interval between outbound sends per conversation (ms)
    #[serde(default = "default_min_send_interval")]
    pub min_send_interval_ms: u64,

    /// TTL of the throttle record in seconds
    #[serde(default = "default_throttle_record_ttl")]
    pub throttle_record_ttl_secs: u64,

    /// Extra delay before a deferred rate-limit notice re-checks (ms)
    #[serde(default = "default_feedback_margin")]
    pub feedback_margin_ms: u64,

    /// Wall-clock budget for one routing attempt (ms)
    #[serde(default = "default_routing_deadline")]
    pub routing_deadline_ms: u64,
}

impl PipelineConfig {
    /// Convert to the application-layer settings struct
    pub fn to_settings(&self) -> PipelineSettings {
        PipelineSettings {
            dedup_window_secs: self.dedup_window_secs,
            dedup_cache_capacity: self.dedup_cache_capacity,
            min_send_interval_ms: self.min_send_interval_ms,
            throttle_record_ttl_secs: self.throttle_record_ttl_secs,
            feedback_margin_ms: self.feedback_margin_ms,
            routing_deadline_ms: self.routing_deadline_ms,
        }
    }

    /// Validate pipeline configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dedup_window_secs == 0 {
            return Err(ValidationError::InvalidDedupWindow);
        }
        if self.min_send_interval_ms == 0 {
            return Err(ValidationError::InvalidSendInterval);
        }
        if self.routing_deadline_ms == 0 {
            return Err(ValidationError::InvalidRoutingDeadline);
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dedup_window_secs: default_dedup_window(),
            dedup_cache_capacity: default_dedup_cache_capacity(),
            min_send_interval_ms: default_min_send_interval(),
            throttle_record_ttl_secs: default_throttle_record_ttl(),
            feedback_margin_ms: default_feedback_margin(),
            routing_deadline_ms: default_routing_deadline(),
        }
    }
}

fn default_dedup_window() -> u64 {
    3600
}

fn default_dedup_cache_capacity() -> usize {
    5000
}

fn default_min_send_interval() -> u64 {
    900
}

fn default_throttle_record_ttl() -> u64 {
    60
}

fn default_feedback_margin() -> u64 {
    150
}

fn default_routing_deadline() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_settings() {
        let config = PipelineConfig::default();
        let settings = config.to_settings();
        let expected = PipelineSettings::default();
        assert_eq!(settings.dedup_window_secs, expected.dedup_window_secs);
        assert_eq!(settings.min_send_interval_ms, expected.min_send_interval_ms);
        assert_eq!(settings.routing_deadline_ms, expected.routing_deadline_ms);
    }

    #[test]
    fn zero_interval_is_invalid() {
        let config = PipelineConfig {
            min_send_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_deadline_is_invalid() {
        let config = PipelineConfig {
            routing_deadline_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
