use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::menu::{MenuPatch, MenuView, NewMenu};
use super::order::{
    ItemStatusChange, OrderItemInput, OrderStatusChange, OrderView, Settlement, SubmittedOrder,
};
use super::status::{ItemStatus, OrderStatus, TableStatus};
use super::table::{NewTable, TableView};

/// Storage port for the front-of-house aggregates.
///
/// Every method that writes more than one row must do so atomically, and the
/// status writes must run the allowed-transition checks and the
/// propagation in [`crate::domain::sync`] against the state they read.
pub trait RestaurantRepository: Send + Sync + 'static {
    fn create_menu(&self, menu: NewMenu) -> Result<MenuView, DomainError>;
    fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<MenuView, DomainError>;
    /// Active menus ordered by name.
    fn active_menus(&self) -> Result<Vec<MenuView>, DomainError>;

    fn create_table(&self, table: NewTable) -> Result<TableView, DomainError>;
    /// All tables ordered by number.
    fn list_tables(&self) -> Result<Vec<TableView>, DomainError>;
    fn find_table(&self, id: Uuid) -> Result<Option<TableView>, DomainError>;
    fn find_table_by_number(&self, number: i32) -> Result<Option<TableView>, DomainError>;
    fn set_table_status(&self, id: Uuid, status: TableStatus) -> Result<TableView, DomainError>;

    /// Create the order and its items with prices captured from the menu,
    /// then mark the table `ordered`.
    fn submit_order(
        &self,
        table_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<SubmittedOrder, DomainError>;
    fn find_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    /// Non-paid orders of a table, newest first.
    fn unpaid_orders(&self, table_id: Uuid) -> Result<Vec<OrderView>, DomainError>;
    /// Cooking/ready orders with at least one item that needs the kitchen,
    /// oldest first.
    fn kitchen_orders(&self) -> Result<Vec<OrderView>, DomainError>;
    fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderStatusChange, DomainError>;
    fn set_order_discount(&self, id: Uuid, discount: i64) -> Result<OrderView, DomainError>;
    fn set_item_status(&self, id: Uuid, status: ItemStatus)
        -> Result<ItemStatusChange, DomainError>;

    /// Move pending/confirmed orders created at or before `cutoff` to
    /// cooking. Returns how many orders moved.
    fn advance_stale_orders(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
    /// Mark every non-paid order of the table and the table itself paid.
    fn settle_table(&self, table_id: Uuid) -> Result<Settlement, DomainError>;
}

impl<T: RestaurantRepository + ?Sized> RestaurantRepository for Arc<T> {
    fn create_menu(&self, menu: NewMenu) -> Result<MenuView, DomainError> {
        (**self).create_menu(menu)
    }

    fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<MenuView, DomainError> {
        (**self).update_menu(id, patch)
    }

    fn active_menus(&self) -> Result<Vec<MenuView>, DomainError> {
        (**self).active_menus()
    }

    fn create_table(&self, table: NewTable) -> Result<TableView, DomainError> {
        (**self).create_table(table)
    }

    fn list_tables(&self) -> Result<Vec<TableView>, DomainError> {
        (**self).list_tables()
    }

    fn find_table(&self, id: Uuid) -> Result<Option<TableView>, DomainError> {
        (**self).find_table(id)
    }

    fn find_table_by_number(&self, number: i32) -> Result<Option<TableView>, DomainError> {
        (**self).find_table_by_number(number)
    }

    fn set_table_status(&self, id: Uuid, status: TableStatus) -> Result<TableView, DomainError> {
        (**self).set_table_status(id, status)
    }

    fn submit_order(
        &self,
        table_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<SubmittedOrder, DomainError> {
        (**self).submit_order(table_id, items)
    }

    fn find_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        (**self).find_order(id)
    }

    fn unpaid_orders(&self, table_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        (**self).unpaid_orders(table_id)
    }

    fn kitchen_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        (**self).kitchen_orders()
    }

    fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderStatusChange, DomainError> {
        (**self).set_order_status(id, status)
    }

    fn set_order_discount(&self, id: Uuid, discount: i64) -> Result<OrderView, DomainError> {
        (**self).set_order_discount(id, discount)
    }

    fn set_item_status(
        &self,
        id: Uuid,
        status: ItemStatus,
    ) -> Result<ItemStatusChange, DomainError> {
        (**self).set_item_status(id, status)
    }

    fn advance_stale_orders(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        (**self).advance_stale_orders(cutoff)
    }

    fn settle_table(&self, table_id: Uuid) -> Result<Settlement, DomainError> {
        (**self).settle_table(table_id)
    }
}
