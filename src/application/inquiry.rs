//! Order inquiry presentation - status text per order state.

use crate::domain::conversation::Order;

/// Fixed reply when an order id matches nothing.
pub const ORDER_NOT_FOUND_NOTICE: &str = "We couldn't find an order with that id. \
Please check the id on your confirmation message (it looks like KP-12345) and try again.";

/// Builds the status reply for a found order.
///
/// Tracking details are added only when present; the "ships soon" note
/// only for orders still being prepared or just confirmed.
pub fn status_reply(order: &Order) -> String {
    let mut lines = vec![format!(
        "Your order {} is {}.",
        order.id,
        order.status.label()
    )];

    if let Some(tracking) = &order.tracking {
        lines.push(format!(
            "Track it with {} using {}.",
            tracking.carrier, tracking.tracking_number
        ));
        if let Some(url) = &tracking.url {
            lines.push(url.clone());
        }
    }

    if order.status.ships_soon() {
        lines.push("It should ship within 2-3 business days.".to_string());
    }

    lines.join("\n")
}
