use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::menu::MenuView;
use crate::domain::order::{OrderItemView, OrderView};
use crate::domain::status::{ItemStatus, OrderStatus, TableStatus};
use crate::domain::table::TableView;
use crate::schema::{menus, order_items, orders, restaurant_tables};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = menus)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuRow {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub is_active: bool,
    pub requires_cooking: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MenuRow> for MenuView {
    fn from(row: MenuRow) -> Self {
        MenuView {
            id: row.id,
            name: row.name,
            price: row.price,
            is_active: row.is_active,
            requires_cooking: row.requires_cooking,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = menus)]
pub struct NewMenuRow {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub is_active: bool,
    pub requires_cooking: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = menus)]
pub struct MenuChangeset {
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = restaurant_tables)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TableRow {
    pub id: Uuid,
    pub number: i32,
    pub seats: i32,
    pub status: TableStatus,
    pub qr_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TableRow> for TableView {
    fn from(row: TableRow) -> Self {
        TableView {
            id: row.id,
            number: row.number,
            seats: row.seats,
            status: row.status,
            qr_code: row.qr_code,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = restaurant_tables)]
pub struct NewTableRow {
    pub id: Uuid,
    pub number: i32,
    pub seats: i32,
    pub status: TableStatus,
    pub qr_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub table_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub discount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_view(self, table_number: i32, items: Vec<OrderItemView>) -> OrderView {
        OrderView {
            id: self.id,
            table_id: self.table_id,
            table_number,
            status: self.status,
            total_amount: self.total_amount,
            discount: self.discount,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub table_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub discount: i64,
    /// Taken from the application clock, which also computes the
    /// auto-advance cutoff.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_id: Uuid,
    pub quantity: i32,
    pub options: Value,
    pub unit_price: i64,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderItemRow {
    pub fn into_view(self, menu_name: String) -> OrderItemView {
        let options = match self.options {
            Value::Array(values) => values,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        OrderItemView {
            id: self.id,
            menu_id: self.menu_id,
            menu_name,
            quantity: self.quantity,
            options,
            unit_price: self.unit_price,
            status: self.status,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_id: Uuid,
    pub quantity: i32,
    pub options: Value,
    pub unit_price: i64,
    pub status: ItemStatus,
    /// Strictly increasing within a cart so items read back in cart order.
    pub created_at: DateTime<Utc>,
}
