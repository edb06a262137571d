use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;
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
use crate::schema::{menus, order_items, orders, restaurant_tables};

use super::models::{
    MenuChangeset, MenuRow, NewMenuRow, NewOrderItemRow, NewOrderRow, NewTableRow, OrderItemRow,
    OrderRow, TableRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Query helpers ────────────────────────────────────────────────────────────

fn lock_table(conn: &mut PgConnection, id: Uuid) -> Result<TableRow, DomainError> {
    restaurant_tables::table
        .find(id)
        .select(TableRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Table"))
}

fn lock_order(conn: &mut PgConnection, id: Uuid) -> Result<OrderRow, DomainError> {
    orders::table
        .find(id)
        .select(OrderRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Order"))
}

/// Tables are always locked before their orders so that settlement and
/// status propagation acquire row locks in the same order.
fn table_of_order(conn: &mut PgConnection, order_id: Uuid) -> Result<Uuid, DomainError> {
    orders::table
        .find(order_id)
        .select(orders::table_id)
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Order"))
}

fn write_table_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: TableStatus,
) -> Result<(), DomainError> {
    diesel::update(restaurant_tables::table.find(id))
        .set((
            restaurant_tables::status.eq(status),
            restaurant_tables::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(())
}

fn write_order_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: OrderStatus,
) -> Result<(), DomainError> {
    diesel::update(orders::table.find(id))
        .set((orders::status.eq(status), orders::updated_at.eq(Utc::now())))
        .execute(conn)?;
    Ok(())
}

/// Attach table numbers and items (with menu names) to order rows, keeping
/// the row order.
fn load_views(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<OrderView>, DomainError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
    let table_ids: Vec<Uuid> = rows.iter().map(|o| o.table_id).collect();

    let numbers: HashMap<Uuid, i32> = restaurant_tables::table
        .filter(restaurant_tables::id.eq_any(table_ids))
        .select((restaurant_tables::id, restaurant_tables::number))
        .load::<(Uuid, i32)>(conn)?
        .into_iter()
        .collect();

    let items: Vec<(OrderItemRow, String)> = order_items::table
        .inner_join(menus::table)
        .filter(order_items::order_id.eq_any(order_ids))
        .order((order_items::created_at.asc(), order_items::id.asc()))
        .select((OrderItemRow::as_select(), menus::name))
        .load(conn)?;

    let mut grouped: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
    for (item, menu_name) in items {
        grouped
            .entry(item.order_id)
            .or_default()
            .push(item.into_view(menu_name));
    }

    Ok(rows
        .into_iter()
        .map(|o| {
            let number = numbers.get(&o.table_id).copied().unwrap_or_default();
            let items = grouped.remove(&o.id).unwrap_or_default();
            o.into_view(number, items)
        })
        .collect())
}

fn load_view(conn: &mut PgConnection, row: OrderRow) -> Result<OrderView, DomainError> {
    load_views(conn, vec![row])?
        .pop()
        .ok_or_else(|| DomainError::Internal("order view vanished while loading".into()))
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselRestaurantRepository {
    pool: DbPool,
}

impl DieselRestaurantRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RestaurantRepository for DieselRestaurantRepository {
    fn create_menu(&self, menu: NewMenu) -> Result<MenuView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(menus::table)
            .values(&NewMenuRow {
                id: Uuid::new_v4(),
                name: menu.name,
                price: menu.price,
                is_active: menu.is_active,
                requires_cooking: menu.requires_cooking,
            })
            .returning(MenuRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<MenuView, DomainError> {
        let mut conn = self.pool.get()?;

        // An empty changeset is rejected by Diesel, so a no-op patch is a read.
        let row = if patch.price.is_none() && patch.is_active.is_none() {
            menus::table
                .find(id)
                .select(MenuRow::as_select())
                .first(&mut conn)
                .optional()?
        } else {
            diesel::update(menus::table.find(id))
                .set(&MenuChangeset {
                    price: patch.price,
                    is_active: patch.is_active,
                })
                .returning(MenuRow::as_returning())
                .get_result(&mut conn)
                .optional()?
        };

        row.map(Into::into).ok_or(DomainError::NotFound("Menu"))
    }

    fn active_menus(&self) -> Result<Vec<MenuView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = menus::table
            .filter(menus::is_active.eq(true))
            .order(menus::name.asc())
            .select(MenuRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn create_table(&self, table: NewTable) -> Result<TableView, DomainError> {
        let mut conn = self.pool.get()?;
        let number = table.number;

        let inserted = diesel::insert_into(restaurant_tables::table)
            .values(&NewTableRow {
                id: Uuid::new_v4(),
                number: table.number,
                seats: table.seats,
                status: TableStatus::Empty,
                qr_code: table.qr_code,
            })
            .returning(TableRow::as_returning())
            .get_result(&mut conn);

        match inserted {
            Ok(row) => Ok(row.into()),
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Err(
                DomainError::InvalidInput(format!("table number {} already exists", number)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    fn list_tables(&self) -> Result<Vec<TableView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = restaurant_tables::table
            .order(restaurant_tables::number.asc())
            .select(TableRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn find_table(&self, id: Uuid) -> Result<Option<TableView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = restaurant_tables::table
            .find(id)
            .select(TableRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn find_table_by_number(&self, number: i32) -> Result<Option<TableView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = restaurant_tables::table
            .filter(restaurant_tables::number.eq(number))
            .select(TableRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn set_table_status(&self, id: Uuid, status: TableStatus) -> Result<TableView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut table = lock_table(conn, id)?;
            if !table.status.can_transition_to(status) {
                return Err(DomainError::InvalidTransition);
            }
            write_table_status(conn, id, status)?;
            table.status = status;
            Ok(table.into())
        })
    }

    fn submit_order(
        &self,
        table_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<SubmittedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the table so concurrent carts for it serialize here.
            lock_table(conn, table_id)?;

            // 2. Capture current menu prices
            let menu_ids: Vec<Uuid> = items.iter().map(|i| i.menu_id).collect();
            let menus: HashMap<Uuid, MenuRow> = menus::table
                .filter(menus::id.eq_any(menu_ids))
                .select(MenuRow::as_select())
                .load(conn)?
                .into_iter()
                .map(|m| (m.id, m))
                .collect();

            let order_id = Uuid::new_v4();
            let now = Utc::now();
            let mut lines = Vec::with_capacity(items.len());
            let mut new_items = Vec::with_capacity(items.len());
            for (position, item) in (0i64..).zip(items) {
                let menu = menus
                    .get(&item.menu_id)
                    .ok_or(DomainError::NotFound("Menu"))?;
                if !menu.is_active {
                    return Err(DomainError::InvalidInput(format!(
                        "menu '{}' is not available",
                        menu.name
                    )));
                }
                lines.push((menu.price, item.quantity));
                new_items.push(NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    menu_id: menu.id,
                    quantity: item.quantity,
                    options: Value::Array(item.options),
                    unit_price: menu.price,
                    status: ItemStatus::Cooking,
                    created_at: now + Duration::microseconds(position),
                });
            }
            let total_amount = cart_total(lines)?;

            // 3. Insert the order and its items
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    table_id,
                    status: OrderStatus::Pending,
                    total_amount,
                    discount: 0,
                    created_at: now,
                    updated_at: now,
                })
                .execute(conn)?;
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            // 4. The table now has an open order
            write_table_status(conn, table_id, TableStatus::Ordered)?;

            Ok(SubmittedOrder {
                order_id,
                table_id,
                total_amount,
            })
        })
    }

    fn find_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        load_view(&mut conn, order).map(Some)
    }

    fn unpaid_orders(&self, table_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::table_id.eq(table_id))
            .filter(orders::status.ne(OrderStatus::Paid))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        load_views(&mut conn, rows)
    }

    fn kitchen_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let needs_kitchen = order_items::table
            .inner_join(menus::table)
            .filter(menus::requires_cooking.eq(true))
            .select(order_items::order_id);

        let rows = orders::table
            .filter(orders::status.eq_any(OrderStatus::IN_KITCHEN))
            .filter(orders::id.eq_any(needs_kitchen))
            .order(orders::created_at.asc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        load_views(&mut conn, rows)
    }

    fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderStatusChange, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let table_id = table_of_order(conn, id)?;
            lock_table(conn, table_id)?;
            let order = lock_order(conn, id)?;
            if !order.status.can_transition_to(status) {
                return Err(DomainError::InvalidTransition);
            }
            write_order_status(conn, id, status)?;

            let table_status = sync::after_order_write(status);
            if let Some(table_status) = table_status {
                write_table_status(conn, order.table_id, table_status)?;
            }

            Ok(OrderStatusChange {
                order_id: id,
                status,
                table_status,
            })
        })
    }

    fn set_order_discount(&self, id: Uuid, discount: i64) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = lock_order(conn, id)?;
            validate_discount(order.total_amount, discount)?;

            let order = diesel::update(orders::table.find(id))
                .set((
                    orders::discount.eq(discount),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            load_view(conn, order)
        })
    }

    fn set_item_status(
        &self,
        id: Uuid,
        status: ItemStatus,
    ) -> Result<ItemStatusChange, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let item = order_items::table
                .find(id)
                .select(OrderItemRow::as_select())
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Order item"))?;
            if !item.status.can_transition_to(status) {
                return Err(DomainError::InvalidTransition);
            }

            let table_id = table_of_order(conn, item.order_id)?;
            let mut table = lock_table(conn, table_id)?;
            let mut order = lock_order(conn, item.order_id)?;
            diesel::update(order_items::table.find(id))
                .set(order_items::status.eq(status))
                .execute(conn)?;

            let siblings: Vec<ItemStatus> = order_items::table
                .filter(order_items::order_id.eq(order.id))
                .select(order_items::status)
                .load(conn)?;

            if let Some(propagation) = sync::after_item_write(order.status, &siblings) {
                write_order_status(conn, order.id, propagation.order)?;
                write_table_status(conn, table.id, propagation.table)?;
                order.status = propagation.order;
                table.status = propagation.table;
            }

            Ok(ItemStatusChange {
                item_id: id,
                order_id: order.id,
                status,
                order_status: order.status,
                table_status: table.status,
            })
        })
    }

    fn advance_stale_orders(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let stale_tables: Vec<Uuid> = orders::table
                .filter(orders::status.eq_any(OrderStatus::AWAITING_KITCHEN))
                .filter(orders::created_at.le(cutoff))
                .select(orders::table_id)
                .distinct()
                .load(conn)?;
            if stale_tables.is_empty() {
                return Ok(0);
            }

            // Same lock order as the other writers: tables by id, then orders.
            let locked: Vec<Uuid> = restaurant_tables::table
                .filter(restaurant_tables::id.eq_any(stale_tables))
                .order(restaurant_tables::id.asc())
                .select(restaurant_tables::id)
                .for_update()
                .load(conn)?;

            let moved = diesel::update(
                orders::table
                    .filter(orders::table_id.eq_any(locked))
                    .filter(orders::status.eq_any(OrderStatus::AWAITING_KITCHEN))
                    .filter(orders::created_at.le(cutoff)),
            )
            .set((
                orders::status.eq(OrderStatus::Cooking),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

            Ok(moved)
        })
    }

    fn settle_table(&self, table_id: Uuid) -> Result<Settlement, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_table(conn, table_id)?;

            let unpaid: Vec<(Uuid, i64, i64)> = orders::table
                .filter(orders::table_id.eq(table_id))
                .filter(orders::status.ne(OrderStatus::Paid))
                .order(orders::created_at.asc())
                .select((orders::id, orders::total_amount, orders::discount))
                .for_update()
                .load(conn)?;

            let total_amount = settlement_total(unpaid.iter().map(|(_, t, d)| (*t, *d)))?;

            diesel::update(
                orders::table
                    .filter(orders::table_id.eq(table_id))
                    .filter(orders::status.ne(OrderStatus::Paid)),
            )
            .set((
                orders::status.eq(OrderStatus::Paid),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

            write_table_status(conn, table_id, TableStatus::Paid)?;

            Ok(Settlement {
                table_id,
                total_amount,
                settled_orders: unpaid.into_iter().map(|(id, _, _)| id).collect(),
            })
        })
    }
}
