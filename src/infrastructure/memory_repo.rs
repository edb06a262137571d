use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::menu::{MenuPatch, MenuView, NewMenu};
use crate::domain::order::{
    cart_total, settlement_total, validate_discount, ItemStatusChange, OrderItemInput,
    OrderItemView, OrderStatusChange, OrderView, Settlement, SubmittedOrder,
};
use crate::domain::ports::RestaurantRepository;
use crate::domain::status::{ItemStatus, OrderStatus, TableStatus};
use crate::domain::sync;
use crate::domain::table::{NewTable, TableView};

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct OrderRecord {
    id: Uuid,
    table_id: Uuid,
    status: OrderStatus,
    total_amount: i64,
    discount: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ItemRecord {
    id: Uuid,
    order_id: Uuid,
    menu_id: Uuid,
    quantity: i32,
    options: Vec<Value>,
    unit_price: i64,
    status: ItemStatus,
}

#[derive(Debug, Default)]
struct State {
    menus: Vec<MenuView>,
    tables: Vec<TableView>,
    /// Insertion order doubles as creation order.
    orders: Vec<OrderRecord>,
    items: Vec<ItemRecord>,
}

impl State {
    fn table_mut(&mut self, id: Uuid) -> Result<&mut TableView, DomainError> {
        self.tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DomainError::NotFound("Table"))
    }

    fn order_mut(&mut self, id: Uuid) -> Result<&mut OrderRecord, DomainError> {
        self.orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound("Order"))
    }

    fn view(&self, order: &OrderRecord) -> OrderView {
        let table_number = self
            .tables
            .iter()
            .find(|t| t.id == order.table_id)
            .map(|t| t.number)
            .unwrap_or_default();

        let items = self
            .items
            .iter()
            .filter(|i| i.order_id == order.id)
            .map(|i| OrderItemView {
                id: i.id,
                menu_id: i.menu_id,
                menu_name: self
                    .menus
                    .iter()
                    .find(|m| m.id == i.menu_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                quantity: i.quantity,
                options: i.options.clone(),
                unit_price: i.unit_price,
                status: i.status,
            })
            .collect();

        OrderView {
            id: order.id,
            table_id: order.table_id,
            table_number,
            status: order.status,
            total_amount: order.total_amount,
            discount: order.discount,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items,
        }
    }

    fn needs_kitchen(&self, order_id: Uuid) -> bool {
        self.items.iter().filter(|i| i.order_id == order_id).any(|i| {
            self.menus
                .iter()
                .any(|m| m.id == i.menu_id && m.requires_cooking)
        })
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

/// Process-local storage backend. Each call holds one lock for its whole
/// duration, which gives the same all-or-nothing writes as a transaction.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Internal(format!("state lock poisoned: {}", e)))
    }
}

impl RestaurantRepository for InMemoryRepository {
    fn create_menu(&self, menu: NewMenu) -> Result<MenuView, DomainError> {
        let mut state = self.lock()?;
        let view = MenuView {
            id: Uuid::new_v4(),
            name: menu.name,
            price: menu.price,
            is_active: menu.is_active,
            requires_cooking: menu.requires_cooking,
        };
        state.menus.push(view.clone());
        Ok(view)
    }

    fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<MenuView, DomainError> {
        let mut state = self.lock()?;
        let menu = state
            .menus
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(DomainError::NotFound("Menu"))?;
        if let Some(price) = patch.price {
            menu.price = price;
        }
        if let Some(is_active) = patch.is_active {
            menu.is_active = is_active;
        }
        Ok(menu.clone())
    }

    fn active_menus(&self) -> Result<Vec<MenuView>, DomainError> {
        let state = self.lock()?;
        let mut menus: Vec<MenuView> = state.menus.iter().filter(|m| m.is_active).cloned().collect();
        menus.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(menus)
    }

    fn create_table(&self, table: NewTable) -> Result<TableView, DomainError> {
        let mut state = self.lock()?;
        if state.tables.iter().any(|t| t.number == table.number) {
            return Err(DomainError::InvalidInput(format!(
                "table number {} already exists",
                table.number
            )));
        }
        let view = TableView {
            id: Uuid::new_v4(),
            number: table.number,
            seats: table.seats,
            status: TableStatus::Empty,
            qr_code: table.qr_code,
        };
        state.tables.push(view.clone());
        Ok(view)
    }

    fn list_tables(&self) -> Result<Vec<TableView>, DomainError> {
        let state = self.lock()?;
        let mut tables = state.tables.clone();
        tables.sort_by_key(|t| t.number);
        Ok(tables)
    }

    fn find_table(&self, id: Uuid) -> Result<Option<TableView>, DomainError> {
        let state = self.lock()?;
        Ok(state.tables.iter().find(|t| t.id == id).cloned())
    }

    fn find_table_by_number(&self, number: i32) -> Result<Option<TableView>, DomainError> {
        let state = self.lock()?;
        Ok(state.tables.iter().find(|t| t.number == number).cloned())
    }

    fn set_table_status(&self, id: Uuid, status: TableStatus) -> Result<TableView, DomainError> {
        let mut state = self.lock()?;
        let table = state.table_mut(id)?;
        if !table.status.can_transition_to(status) {
            return Err(DomainError::InvalidTransition);
        }
        table.status = status;
        Ok(table.clone())
    }

    fn submit_order(
        &self,
        table_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<SubmittedOrder, DomainError> {
        let mut state = self.lock()?;
        state.table_mut(table_id)?;

        let mut priced = Vec::with_capacity(items.len());
        for item in items {
            let menu = state
                .menus
                .iter()
                .find(|m| m.id == item.menu_id)
                .ok_or(DomainError::NotFound("Menu"))?;
            if !menu.is_active {
                return Err(DomainError::InvalidInput(format!(
                    "menu '{}' is not available",
                    menu.name
                )));
            }
            priced.push((item, menu.price));
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let total_amount =
            cart_total(priced.iter().map(|(item, price)| (*price, item.quantity)))?;

        for (item, unit_price) in priced {
            state.items.push(ItemRecord {
                id: Uuid::new_v4(),
                order_id,
                menu_id: item.menu_id,
                quantity: item.quantity,
                options: item.options,
                unit_price,
                status: ItemStatus::Cooking,
            });
        }
        state.orders.push(OrderRecord {
            id: order_id,
            table_id,
            status: OrderStatus::Pending,
            total_amount,
            discount: 0,
            created_at: now,
            updated_at: now,
        });
        state.table_mut(table_id)?.status = TableStatus::Ordered;

        Ok(SubmittedOrder {
            order_id,
            table_id,
            total_amount,
        })
    }

    fn find_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| state.view(o)))
    }

    fn unpaid_orders(&self, table_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let state = self.lock()?;
        let mut orders: Vec<&OrderRecord> = state
            .orders
            .iter()
            .rev()
            .filter(|o| o.table_id == table_id && !o.status.is_paid())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders.into_iter().map(|o| state.view(o)).collect())
    }

    fn kitchen_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        let state = self.lock()?;
        let mut orders: Vec<&OrderRecord> = state
            .orders
            .iter()
            .filter(|o| OrderStatus::IN_KITCHEN.contains(&o.status) && state.needs_kitchen(o.id))
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders.into_iter().map(|o| state.view(o)).collect())
    }

    fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderStatusChange, DomainError> {
        let mut state = self.lock()?;
        let order = state.order_mut(id)?;
        if !order.status.can_transition_to(status) {
            return Err(DomainError::InvalidTransition);
        }
        order.status = status;
        order.updated_at = Utc::now();
        let table_id = order.table_id;

        let table_status = sync::after_order_write(status);
        if let Some(table_status) = table_status {
            state.table_mut(table_id)?.status = table_status;
        }

        Ok(OrderStatusChange {
            order_id: id,
            status,
            table_status,
        })
    }

    fn set_order_discount(&self, id: Uuid, discount: i64) -> Result<OrderView, DomainError> {
        let mut state = self.lock()?;
        let order = state.order_mut(id)?;
        validate_discount(order.total_amount, discount)?;
        order.discount = discount;
        order.updated_at = Utc::now();
        let order = order.clone();
        Ok(state.view(&order))
    }

    fn set_item_status(
        &self,
        id: Uuid,
        status: ItemStatus,
    ) -> Result<ItemStatusChange, DomainError> {
        let mut state = self.lock()?;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(DomainError::NotFound("Order item"))?;
        if !item.status.can_transition_to(status) {
            return Err(DomainError::InvalidTransition);
        }
        item.status = status;
        let order_id = item.order_id;

        let siblings: Vec<ItemStatus> = state
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .map(|i| i.status)
            .collect();
        let order = state.order_mut(order_id)?;
        let table_id = order.table_id;

        if let Some(propagation) = sync::after_item_write(order.status, &siblings) {
            order.status = propagation.order;
            order.updated_at = Utc::now();
            state.table_mut(table_id)?.status = propagation.table;
        }

        let order_status = state.order_mut(order_id)?.status;
        let table_status = state.table_mut(table_id)?.status;
        Ok(ItemStatusChange {
            item_id: id,
            order_id,
            status,
            order_status,
            table_status,
        })
    }

    fn advance_stale_orders(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let mut moved = 0;
        for order in state
            .orders
            .iter_mut()
            .filter(|o| OrderStatus::AWAITING_KITCHEN.contains(&o.status) && o.created_at <= cutoff)
        {
            order.status = OrderStatus::Cooking;
            order.updated_at = now;
            moved += 1;
        }
        Ok(moved)
    }

    fn settle_table(&self, table_id: Uuid) -> Result<Settlement, DomainError> {
        let mut state = self.lock()?;
        state.table_mut(table_id)?;

        // Priced before any write so a failure leaves the table untouched.
        let total_amount = settlement_total(
            state
                .orders
                .iter()
                .filter(|o| o.table_id == table_id && !o.status.is_paid())
                .map(|o| (o.total_amount, o.discount)),
        )?;

        let now = Utc::now();
        let mut settled_orders = Vec::new();
        for order in state
            .orders
            .iter_mut()
            .filter(|o| o.table_id == table_id && !o.status.is_paid())
        {
            settled_orders.push(order.id);
            order.status = OrderStatus::Paid;
            order.updated_at = now;
        }
        state.table_mut(table_id)?.status = TableStatus::Paid;

        Ok(Settlement {
            table_id,
            settled_orders,
            total_amount,
        })
    }
}
