//! Messaging gateway adapters.

mod http_gateway;

pub use http_gateway::{HttpGatewayConfig, HttpMessagingGateway};
