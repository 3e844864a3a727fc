//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Stable address of one conversation partner (a phone number in E.164-ish
/// form). The unit of sequencing, throttling, and state ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Creates a ConversationId from a phone address.
    ///
    /// Accepts digits with an optional leading `+`; rejects empty input
    /// and anything containing non-address characters.
    pub fn new(address: impl Into<String>) -> Result<Self, ValidationError> {
        let address = address.into();
        if address.is_empty() {
            return Err(ValidationError::empty_field("conversation_id"));
        }
        let digits = address.strip_prefix('+').unwrap_or(&address);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "conversation_id",
                "expected a phone address (digits with optional leading +)",
            ));
        }
        Ok(Self(address))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Provider-assigned identifier of an inbound event.
///
/// Opaque to the pipeline; used as the idempotency key for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates an EventId from the provider's message id.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("event_id"));
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storefront order identifier: `KP-` followed by at least four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    const PREFIX: &'static str = "KP-";
    const MIN_DIGITS: usize = 4;

    /// Creates an OrderId, validating the `KP-` + digits format.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into().to_ascii_uppercase();
        let digits = id.strip_prefix(Self::PREFIX).ok_or_else(|| {
            ValidationError::invalid_format("order_id", "missing KP- prefix")
        })?;
        if digits.len() < Self::MIN_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "order_id",
                "expected at least four digits after KP-",
            ));
        }
        Ok(Self(id))
    }

    /// Generates a fresh order id for a newly placed catalog order.
    pub fn generate() -> Self {
        let serial = Uuid::new_v4().as_u128() % 100_000_000;
        Self(format!("{}{:08}", Self::PREFIX, serial))
    }

    /// Scans free text for an order id token.
    ///
    /// Tolerant of case and surrounding punctuation; returns the first
    /// token that matches the `KP-` + digits pattern.
    pub fn extract(text: &str) -> Option<Self> {
        let upper = text.to_ascii_uppercase();
        for token in upper.split(|c: char| c.is_whitespace() || c == ',' || c == ';') {
            let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-');
            if let Ok(id) = Self::new(token) {
                return Some(id);
            }
        }
        None
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
