//! Errors that prevent the router from producing any reply.
//!
//! These are the only failures that trigger the fallback notice. Audit,
//! telemetry, and state-persistence failures are contained where they
//! happen (logged, never raised) because a reply already dispatched to
//! the gateway is irreversible.

use thiserror::Error;

use crate::ports::{GatewayError, MenuError, OrderRepositoryError, StoreError};

/// A routing attempt that could not produce a reply.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("gateway send failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("menu provider failed: {0}")]
    Menu(#[from] MenuError),

    #[error("order lookup failed: {0}")]
    Orders(#[from] OrderRepositoryError),

    #[error("conversation store failed: {0}")]
    Store(#[from] StoreError),
}
