//! HTTP ingress adapter.
//!
//! The provider delivers inbound events to `POST /webhook` and verifies
//! the subscription with a `GET /webhook` handshake. Payload authenticity
//! is checked with an HMAC-SHA256 signature before anything is parsed.

mod signature;
mod webhook;

pub use signature::{verify_signature, SignatureError};
pub use webhook::{webhook_routes, WebhookState};
