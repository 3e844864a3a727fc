//! Service entrypoint.
//!
//! Loads configuration, connects infrastructure, wires the pipeline, and
//! serves the webhook ingress.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use secrecy::Secret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pearl_concierge::adapters::gateway::{HttpGatewayConfig, HttpMessagingGateway};
use pearl_concierge::adapters::http::{webhook_routes, WebhookState};
use pearl_concierge::adapters::menus::StaticMenuProvider;
use pearl_concierge::adapters::postgres::{PostgresConversationStore, PostgresOrderRepository};
use pearl_concierge::adapters::redis::RedisTtlStore;
use pearl_concierge::adapters::telemetry::{
    NoopTelemetry, WebhookTelemetry, WebhookTelemetryConfig,
};
use pearl_concierge::adapters::translation::{HttpTranslator, PassthroughTranslator};
use pearl_concierge::application::MessagePipeline;
use pearl_concierge::config::AppConfig;
use pearl_concierge::ports::{TelemetryEmitter, Translator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    info!(
        environment = ?config.server.environment,
        "starting pearl-concierge"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let ttl_store = Arc::new(RedisTtlStore::connect(&config.redis.url).await?);
    info!("connected to redis");

    let gateway = Arc::new(HttpMessagingGateway::new(
        HttpGatewayConfig::new(
            config.gateway.access_token.clone(),
            config.gateway.sender_id.clone(),
        )
        .with_base_url(config.gateway.base_url.clone()),
    )?);

    let store = Arc::new(PostgresConversationStore::new(pool.clone()));
    let orders = Arc::new(PostgresOrderRepository::new(pool.clone()));
    let menus = Arc::new(StaticMenuProvider::new());

    let translator: Arc<dyn Translator> = if config.translation.is_configured() {
        let endpoint = config
            .translation
            .endpoint
            .clone()
            .unwrap_or_default();
        info!(endpoint, "translation service configured");
        Arc::new(HttpTranslator::new(endpoint)?)
    } else {
        Arc::new(PassthroughTranslator::new())
    };

    let telemetry: Arc<dyn TelemetryEmitter> = if config.telemetry.is_empty() {
        Arc::new(NoopTelemetry::new())
    } else {
        Arc::new(WebhookTelemetry::new(WebhookTelemetryConfig {
            event_url: config.telemetry.event_url.clone(),
            webhook_url: config.telemetry.webhook_url.clone(),
            log_url: config.telemetry.log_url.clone(),
        }))
    };

    let pipeline = Arc::new(MessagePipeline::new(
        ttl_store,
        gateway,
        store,
        orders,
        menus,
        translator,
        telemetry,
        config.pipeline.to_settings(),
    ));

    let webhook_state = WebhookState {
        pipeline,
        app_secret: Secret::new(config.gateway.app_secret.clone()),
        verify_token: config.gateway.verify_token.clone(),
    };

    let app = webhook_routes()
        .with_state(webhook_state)
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                )))
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}
