//! Closed status sets for tables, orders and order items.
//!
//! Each set carries its own table of allowed `(from, to)` pairs. Writing the
//! current status again is always accepted.

use std::fmt;
use std::str::FromStr;

use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::AsExpression,
    diesel::FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Empty,
    Ordered,
    /// Kitchen is done with the table's food and serving is pending.
    Cooking,
    Paid,
}

impl TableStatus {
    pub const ALL: [TableStatus; 4] = [
        TableStatus::Empty,
        TableStatus::Ordered,
        TableStatus::Cooking,
        TableStatus::Paid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TableStatus::Empty => "empty",
            TableStatus::Ordered => "ordered",
            TableStatus::Cooking => "cooking",
            TableStatus::Paid => "paid",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TableStatus::Empty => "Empty table",
            TableStatus::Ordered => "Order placed",
            TableStatus::Cooking => "Food ready",
            TableStatus::Paid => "Payment complete",
        }
    }

    pub fn can_transition_to(self, next: TableStatus) -> bool {
        use TableStatus::*;

        self == next
            || matches!(
                (self, next),
                (_, Ordered) | (Ordered, Cooking) | (_, Paid) | (Paid, Empty)
            )
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::AsExpression,
    diesel::FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cooking,
    Ready,
    Served,
    Paid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Cooking,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Paid,
    ];

    /// Statuses the background step moves to `Cooking` once the grace period
    /// has passed.
    pub const AWAITING_KITCHEN: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::Confirmed];

    /// Statuses shown on the kitchen board.
    pub const IN_KITCHEN: [OrderStatus; 2] = [OrderStatus::Cooking, OrderStatus::Ready];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cooking => "cooking",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Awaiting order",
            OrderStatus::Confirmed => "Order confirmed",
            OrderStatus::Cooking => "Cooking",
            OrderStatus::Ready => "Cooking complete",
            OrderStatus::Served => "Served",
            OrderStatus::Paid => "Payment complete",
        }
    }

    pub fn is_paid(self) -> bool {
        self == OrderStatus::Paid
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cooking)
                | (Confirmed, Cooking)
                | (Cooking, Ready)
                | (Ready, Cooking)
                | (Ready, Served)
                | (Pending | Confirmed | Cooking | Ready | Served, Paid)
        )
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::AsExpression,
    diesel::FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Cooking,
    Ready,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 2] = [ItemStatus::Cooking, ItemStatus::Ready];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Cooking => "cooking",
            ItemStatus::Ready => "ready",
        }
    }

    pub fn can_transition_to(self, _next: ItemStatus) -> bool {
        true
    }
}

macro_rules! status_str_impls {
    ($($ty:ty),+) => {
        $(
            impl FromStr for $ty {
                type Err = DomainError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    <$ty>::ALL
                        .into_iter()
                        .find(|status| status.as_str() == s)
                        .ok_or(DomainError::InvalidStatus)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

status_str_impls!(TableStatus, OrderStatus, ItemStatus);
