//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `PEARL_CONCIERGE_` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use pearl_concierge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod gateway;
mod pipeline;
mod redis;
mod server;
mod telemetry;
mod translation;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use pipeline::PipelineConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use telemetry::TelemetryConfig;
pub use translation::TranslationConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration (dedup window, throttle records)
    pub redis: RedisConfig,

    /// Messaging gateway configuration (provider API, webhook ingress)
    pub gateway: GatewayConfig,

    /// Pipeline tunables
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Telemetry sink endpoints
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Translation service
    #[serde(default)]
    pub translation: TranslationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables
    /// with the `PEARL_CONCIERGE` prefix, using `__` to separate nested
    /// values:
    ///
    /// - `PEARL_CONCIERGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PEARL_CONCIERGE__DATABASE__URL=...` -> `database.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PEARL_CONCIERGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.gateway.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var(
            "PEARL_CONCIERGE__DATABASE__URL",
            "postgresql://test@localhost/test",
        );
        env::set_var("PEARL_CONCIERGE__REDIS__URL", "redis://localhost:6379");
        env::set_var("PEARL_CONCIERGE__GATEWAY__ACCESS_TOKEN", "EAAtoken");
        env::set_var("PEARL_CONCIERGE__GATEWAY__SENDER_ID", "1234567890");
        env::set_var("PEARL_CONCIERGE__GATEWAY__VERIFY_TOKEN", "handshake");
        env::set_var("PEARL_CONCIERGE__GATEWAY__APP_SECRET", "app-secret");
    }

    fn clear_env() {
        env::remove_var("PEARL_CONCIERGE__DATABASE__URL");
        env::remove_var("PEARL_CONCIERGE__REDIS__URL");
        env::remove_var("PEARL_CONCIERGE__GATEWAY__ACCESS_TOKEN");
        env::remove_var("PEARL_CONCIERGE__GATEWAY__SENDER_ID");
        env::remove_var("PEARL_CONCIERGE__GATEWAY__VERIFY_TOKEN");
        env::remove_var("PEARL_CONCIERGE__GATEWAY__APP_SECRET");
        env::remove_var("PEARL_CONCIERGE__SERVER__PORT");
        env::remove_var("PEARL_CONCIERGE__PIPELINE__MIN_SEND_INTERVAL_MS");
    }

    #[test]
    fn loads_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn pipeline_defaults_apply_when_unset() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.pipeline.min_send_interval_ms, 900);
        assert_eq!(config.pipeline.dedup_window_secs, 3600);
        assert_eq!(config.pipeline.routing_deadline_ms, 5000);
    }

    #[test]
    fn pipeline_tunables_override_from_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PEARL_CONCIERGE__PIPELINE__MIN_SEND_INTERVAL_MS", "1200");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.pipeline.min_send_interval_ms, 1200);
    }
}
