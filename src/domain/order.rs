use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::errors::DomainError;
use super::status::{ItemStatus, OrderStatus, TableStatus};

#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub menu_id: Uuid,
    pub quantity: i32,
    pub options: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub menu_name: String,
    pub quantity: i32,
    pub options: Vec<Value>,
    pub unit_price: i64,
    pub status: ItemStatus,
}

impl OrderItemView {
    /// Stored items were priced through [`line_total`], so this cannot
    /// exceed the checked value.
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub table_id: Uuid,
    pub table_number: i32,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub discount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    pub fn final_amount(&self) -> i64 {
        final_amount(self.total_amount, self.discount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedOrder {
    pub order_id: Uuid,
    pub table_id: Uuid,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatusChange {
    pub order_id: Uuid,
    pub status: OrderStatus,
    /// Set when the write also moved the table.
    pub table_status: Option<TableStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStatusChange {
    pub item_id: Uuid,
    pub order_id: Uuid,
    pub status: ItemStatus,
    pub order_status: OrderStatus,
    pub table_status: TableStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub table_id: Uuid,
    pub settled_orders: Vec<Uuid>,
    pub total_amount: i64,
}

fn amount_overflow() -> DomainError {
    DomainError::InvalidInput("amount is too large".to_string())
}

pub fn line_total(unit_price: i64, quantity: i32) -> Result<i64, DomainError> {
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or_else(amount_overflow)
}

/// Sum of `unit_price × quantity` over a priced cart.
pub fn cart_total<I>(lines: I) -> Result<i64, DomainError>
where
    I: IntoIterator<Item = (i64, i32)>,
{
    lines.into_iter().try_fold(0i64, |acc, (price, quantity)| {
        acc.checked_add(line_total(price, quantity)?)
            .ok_or_else(amount_overflow)
    })
}

pub fn final_amount(total_amount: i64, discount: i64) -> i64 {
    total_amount - discount
}

/// Sum of payable amounts over `(total_amount, discount)` pairs.
pub fn settlement_total<I>(orders: I) -> Result<i64, DomainError>
where
    I: IntoIterator<Item = (i64, i64)>,
{
    orders.into_iter().try_fold(0i64, |acc, (total, discount)| {
        acc.checked_add(final_amount(total, discount))
            .ok_or_else(amount_overflow)
    })
}

/// Reject carts that cannot become an order.
pub fn validate_cart(items: &[OrderItemInput]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::InvalidInput(
            "an order needs at least one item".to_string(),
        ));
    }
    if let Some(item) = items.iter().find(|i| i.quantity < 1) {
        return Err(DomainError::InvalidInput(format!(
            "quantity for menu {} must be at least 1, got {}",
            item.menu_id, item.quantity
        )));
    }
    Ok(())
}

pub fn validate_discount(total_amount: i64, discount: i64) -> Result<(), DomainError> {
    if discount < 0 {
        return Err(DomainError::InvalidInput(
            "discount must not be negative".to_string(),
        ));
    }
    if discount > total_amount {
        return Err(DomainError::InvalidInput(format!(
            "discount {} exceeds order total {}",
            discount, total_amount
        )));
    }
    Ok(())
}
