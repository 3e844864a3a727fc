//! Adapters - Implementations of port interfaces.
//!
//! - `redis` / `postgres` - production stores
//! - `gateway` - HTTP messaging gateway client
//! - `menus` - built-in storefront menu provider
//! - `telemetry` - webhook sinks and the no-op emitter
//! - `translation` - pass-through and HTTP translators
//! - `http` - inbound webhook ingress
//! - `memory` - in-memory implementations for testing

pub mod gateway;
pub mod http;
pub mod memory;
pub mod menus;
pub mod postgres;
pub mod redis;
pub mod telemetry;
pub mod translation;
