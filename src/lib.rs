//! Pearl Concierge - Conversation pipeline for the Kanak Pearl messaging assistant
//!
//! This crate implements the inbound-event processing core: per-conversation
//! sequencing, idempotent deduplication, outbound throttling, deadline-bounded
//! routing, and the menu state machine that decides what to send next.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
