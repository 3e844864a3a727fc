//! Storefront orders referenced by the inquiry flow.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, OrderId, Timestamp};

use super::event::OrderItem;

/// A placed order, persisted by the order repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub conversation: ConversationId,
    pub items: Vec<OrderItem>,
    /// Order total in minor currency units.
    pub total_minor: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub tracking: Option<TrackingInfo>,
    pub placed_at: Timestamp,
}

impl Order {
    /// Builds a fresh pending order from catalog line items.
    pub fn place(conversation: ConversationId, items: Vec<OrderItem>) -> Self {
        let total_minor = items.iter().map(OrderItem::total_minor).sum();
        let currency = items
            .first()
            .map(|i| i.currency.clone())
            .unwrap_or_else(|| "INR".to_string());
        Self {
            id: OrderId::generate(),
            conversation,
            items,
            total_minor,
            currency,
            status: OrderStatus::Pending,
            tracking: None,
            placed_at: Timestamp::now(),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Customer-facing label used in status replies.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "being prepared",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "on its way",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// True for states that get the "ships soon" note.
    pub fn ships_soon(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Shipment tracking details, present once an order has shipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub carrier: String,
    pub tracking_number: String,
    pub url: Option<String>,
}
