//! Status propagation from order items up to their order and table.
//!
//! Every status write on an item or an order is followed by one of these
//! functions; the storage layer persists whatever they return in the same
//! transaction as the triggering write.

use super::status::{ItemStatus, OrderStatus, TableStatus};

/// Statuses forced onto the parent order and its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Propagation {
    pub order: OrderStatus,
    pub table: TableStatus,
}

/// Derive the parent order/table statuses after an item status write.
///
/// `items` holds the statuses of every item of the order, including the one
/// that was just written. Once every item is ready, an order that is still
/// in the kitchen becomes ready and its table switches to `cooking`.
pub fn after_item_write(order: OrderStatus, items: &[ItemStatus]) -> Option<Propagation> {
    if items.is_empty() || !items.iter().all(|s| *s == ItemStatus::Ready) {
        return None;
    }

    match order {
        OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Cooking | OrderStatus::Ready => {
            Some(Propagation {
                order: OrderStatus::Ready,
                table: TableStatus::Cooking,
            })
        }
        OrderStatus::Served | OrderStatus::Paid => None,
    }
}

/// Table status implied by an explicit order status write, if any.
pub fn after_order_write(order: OrderStatus) -> Option<TableStatus> {
    match order {
        OrderStatus::Ready => Some(TableStatus::Cooking),
        OrderStatus::Paid => Some(TableStatus::Paid),
        _ => None,
    }
}
