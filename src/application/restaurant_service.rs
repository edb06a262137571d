use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::menu::{MenuPatch, MenuView, NewMenu};
use crate::domain::order::{
    settlement_total, validate_cart, ItemStatusChange, OrderItemInput, OrderStatusChange,
    OrderView, SubmittedOrder,
};
use crate::domain::ports::RestaurantRepository;
use crate::domain::status::{ItemStatus, OrderStatus, TableStatus};
use crate::domain::table::{NewTable, TableView};

#[derive(Debug, Clone)]
pub struct TableDetail {
    pub table: TableView,
    pub orders: Vec<OrderView>,
    pub menus: Vec<MenuView>,
    /// Outstanding payable amount across `orders`.
    pub total_amount: i64,
}

#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub payment_method: String,
    pub total_amount: i64,
    pub settled_orders: Vec<Uuid>,
}

impl PaymentReceipt {
    pub fn message(&self) -> String {
        format!("{} payment completed.", self.payment_method)
    }
}

pub struct RestaurantService<R> {
    repo: R,
}

impl<R: RestaurantRepository> RestaurantService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    // ── Menus ────────────────────────────────────────────────────────────────

    pub fn active_menus(&self) -> Result<Vec<MenuView>, DomainError> {
        self.repo.active_menus()
    }

    pub fn create_menu(&self, menu: NewMenu) -> Result<MenuView, DomainError> {
        if menu.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("menu name must not be empty".into()));
        }
        if menu.price < 0 {
            return Err(DomainError::InvalidInput("price must not be negative".into()));
        }
        let created = self.repo.create_menu(menu)?;
        log::info!("Menu {} '{}' created at {}", created.id, created.name, created.price);
        Ok(created)
    }

    pub fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<MenuView, DomainError> {
        if matches!(patch.price, Some(p) if p < 0) {
            return Err(DomainError::InvalidInput("price must not be negative".into()));
        }
        self.repo.update_menu(id, patch)
    }

    // ── Tables ───────────────────────────────────────────────────────────────

    pub fn list_tables(&self) -> Result<Vec<TableView>, DomainError> {
        self.repo.list_tables()
    }

    pub fn create_table(&self, table: NewTable) -> Result<TableView, DomainError> {
        if table.number < 1 {
            return Err(DomainError::InvalidInput("table number must be positive".into()));
        }
        if table.seats < 1 {
            return Err(DomainError::InvalidInput("a table needs at least one seat".into()));
        }
        let created = self.repo.create_table(table)?;
        log::info!("Table {} registered with {} seats", created.number, created.seats);
        Ok(created)
    }

    pub fn table_detail(&self, id: Uuid) -> Result<TableDetail, DomainError> {
        let table = self.table(id)?;
        let orders = self.repo.unpaid_orders(id)?;
        let menus = self.repo.active_menus()?;
        let total_amount =
            settlement_total(orders.iter().map(|o| (o.total_amount, o.discount)))?;

        Ok(TableDetail {
            table,
            orders,
            menus,
            total_amount,
        })
    }

    /// Table plus the menus a table-side terminal may order from.
    pub fn customer_menu(&self, number: i32) -> Result<(TableView, Vec<MenuView>), DomainError> {
        let table = self.table_by_number(number)?;
        let menus = self.repo.active_menus()?;
        Ok((table, menus))
    }

    pub fn update_table_status(&self, id: Uuid, status: &str) -> Result<TableView, DomainError> {
        let status: TableStatus = status.parse()?;
        let table = self.repo.set_table_status(id, status)?;
        log::info!("Table {} set to {}", table.number, table.status);
        Ok(table)
    }

    // ── Orders ───────────────────────────────────────────────────────────────

    pub fn submit_order(
        &self,
        table_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<SubmittedOrder, DomainError> {
        validate_cart(&items)?;
        let submitted = self.repo.submit_order(table_id, items)?;
        log::info!(
            "Order {} submitted for table {} totalling {}",
            submitted.order_id,
            table_id,
            submitted.total_amount
        );
        Ok(submitted)
    }

    pub fn submit_customer_order(
        &self,
        number: i32,
        items: Vec<OrderItemInput>,
    ) -> Result<SubmittedOrder, DomainError> {
        let table = self.table_by_number(number)?;
        self.submit_order(table.id, items)
    }

    /// Unpaid orders for the table-side polling view.
    pub fn customer_orders(&self, number: i32) -> Result<Vec<OrderView>, DomainError> {
        let table = self.table_by_number(number)?;
        self.repo.unpaid_orders(table.id)
    }

    pub fn kitchen_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        self.repo.kitchen_orders()
    }

    pub fn order_detail(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.repo.find_order(id)?.ok_or(DomainError::NotFound("Order"))
    }

    pub fn update_order_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<OrderStatusChange, DomainError> {
        let status: OrderStatus = status.parse()?;
        let change = self.repo.set_order_status(id, status)?;
        log::info!("Order {} set to {}", id, change.status);
        Ok(change)
    }

    pub fn update_item_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<ItemStatusChange, DomainError> {
        let status: ItemStatus = status.parse()?;
        let change = self.repo.set_item_status(id, status)?;
        log::info!(
            "Item {} set to {} (order {} is {}, table is {})",
            id,
            change.status,
            change.order_id,
            change.order_status,
            change.table_status
        );
        Ok(change)
    }

    pub fn set_discount(&self, id: Uuid, discount: i64) -> Result<OrderView, DomainError> {
        if discount < 0 {
            return Err(DomainError::InvalidInput("discount must not be negative".into()));
        }
        self.repo.set_order_discount(id, discount)
    }

    /// Move orders that sat in pending/confirmed for longer than `grace` to
    /// cooking.
    pub fn advance_stale_orders(&self, grace: Duration) -> Result<usize, DomainError> {
        let moved = self.repo.advance_stale_orders(Utc::now() - grace)?;
        if moved > 0 {
            log::info!("Advanced {} order(s) to cooking", moved);
        }
        Ok(moved)
    }

    // ── Payment ──────────────────────────────────────────────────────────────

    pub fn settle(
        &self,
        table_id: Uuid,
        payment_method: String,
    ) -> Result<PaymentReceipt, DomainError> {
        let settlement = self.repo.settle_table(table_id)?;
        log::info!(
            "Table {} settled {} order(s) for {} by {}",
            table_id,
            settlement.settled_orders.len(),
            settlement.total_amount,
            payment_method
        );
        Ok(PaymentReceipt {
            payment_method,
            total_amount: settlement.total_amount,
            settled_orders: settlement.settled_orders,
        })
    }

    fn table(&self, id: Uuid) -> Result<TableView, DomainError> {
        self.repo.find_table(id)?.ok_or(DomainError::NotFound("Table"))
    }

    fn table_by_number(&self, number: i32) -> Result<TableView, DomainError> {
        self.repo
            .find_table_by_number(number)?
            .ok_or(DomainError::NotFound("Table"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::DEFAULT_SEATS;
    use crate::infrastructure::memory_repo::InMemoryRepository;

    struct Fixture {
        svc: RestaurantService<InMemoryRepository>,
        table: TableView,
        pasta: MenuView,
        steak: MenuView,
    }

    fn fixture() -> Fixture {
        let svc = RestaurantService::new(InMemoryRepository::default());
        let table = svc
            .create_table(NewTable {
                number: 5,
                seats: DEFAULT_SEATS,
                qr_code: None,
            })
            .unwrap();
        let pasta = svc.create_menu(menu("Pasta", 8000, true)).unwrap();
        let steak = svc.create_menu(menu("Steak", 12000, true)).unwrap();
        Fixture {
            svc,
            table,
            pasta,
            steak,
        }
    }

    fn menu(name: &str, price: i64, requires_cooking: bool) -> NewMenu {
        NewMenu {
            name: name.to_string(),
            price,
            is_active: true,
            requires_cooking,
        }
    }

    fn line(menu: &MenuView, quantity: i32) -> OrderItemInput {
        OrderItemInput {
            menu_id: menu.id,
            quantity,
            options: vec![],
        }
    }

    #[test]
    fn submitting_order_totals_lines_and_marks_table_ordered() {
        let f = fixture();

        let submitted = f
            .svc
            .submit_customer_order(5, vec![line(&f.pasta, 1), line(&f.steak, 2)])
            .unwrap();

        assert_eq!(submitted.total_amount, 32000);
        let table = f.svc.table(f.table.id).unwrap();
        assert_eq!(table.status, TableStatus::Ordered);
        let order = f.svc.order_detail(submitted.order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn discounted_order_settles_to_final_amount() {
        let f = fixture();
        let submitted = f
            .svc
            .submit_order(f.table.id, vec![line(&f.pasta, 1), line(&f.steak, 2)])
            .unwrap();
        f.svc.set_discount(submitted.order_id, 2000).unwrap();

        let receipt = f.svc.settle(f.table.id, "card".to_string()).unwrap();

        assert_eq!(receipt.total_amount, 30000);
        assert_eq!(receipt.settled_orders, vec![submitted.order_id]);
        assert_eq!(receipt.message(), "card payment completed.");
        assert_eq!(f.svc.table(f.table.id).unwrap().status, TableStatus::Paid);
        assert_eq!(
            f.svc.order_detail(submitted.order_id).unwrap().status,
            OrderStatus::Paid
        );
    }

    #[test]
    fn settling_a_second_time_charges_nothing() {
        let f = fixture();
        f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();
        f.svc.settle(f.table.id, "cash".to_string()).unwrap();

        let again = f.svc.settle(f.table.id, "cash".to_string()).unwrap();

        assert_eq!(again.total_amount, 0);
        assert!(again.settled_orders.is_empty());
    }

    #[test]
    fn last_ready_item_moves_order_and_table() {
        let f = fixture();
        let submitted = f
            .svc
            .submit_order(f.table.id, vec![line(&f.pasta, 1), line(&f.steak, 1)])
            .unwrap();
        let items = f.svc.order_detail(submitted.order_id).unwrap().items;

        let first = f.svc.update_item_status(items[0].id, "ready").unwrap();
        assert_eq!(first.order_status, OrderStatus::Pending);
        assert_eq!(first.table_status, TableStatus::Ordered);

        let second = f.svc.update_item_status(items[1].id, "ready").unwrap();
        assert_eq!(second.order_status, OrderStatus::Ready);
        assert_eq!(second.table_status, TableStatus::Cooking);
    }

    #[test]
    fn invalid_status_leaves_order_untouched() {
        let f = fixture();
        let submitted = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();

        let err = f.svc.update_order_status(submitted.order_id, "burnt").unwrap_err();

        assert!(matches!(err, DomainError::InvalidStatus));
        assert_eq!(
            f.svc.order_detail(submitted.order_id).unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn disallowed_transition_is_rejected() {
        let f = fixture();
        let submitted = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();

        let err = f.svc.update_order_status(submitted.order_id, "served").unwrap_err();

        assert!(matches!(err, DomainError::InvalidTransition));
    }

    #[test]
    fn explicit_ready_moves_table_to_cooking() {
        let f = fixture();
        let submitted = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();
        f.svc.update_order_status(submitted.order_id, "cooking").unwrap();

        let change = f.svc.update_order_status(submitted.order_id, "ready").unwrap();

        assert_eq!(change.status, OrderStatus::Ready);
        assert_eq!(change.table_status, Some(TableStatus::Cooking));
    }

    #[test]
    fn explicit_paid_moves_table_to_paid() {
        let f = fixture();
        let submitted = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();

        let change = f.svc.update_order_status(submitted.order_id, "paid").unwrap();

        assert_eq!(change.status, OrderStatus::Paid);
        assert_eq!(change.table_status, Some(TableStatus::Paid));
        assert_eq!(f.svc.table(f.table.id).unwrap().status, TableStatus::Paid);
    }

    #[test]
    fn invalid_status_leaves_table_and_item_untouched() {
        let f = fixture();
        let submitted = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();
        let item = f.svc.order_detail(submitted.order_id).unwrap().items[0].id;

        assert!(matches!(
            f.svc.update_table_status(f.table.id, "closed"),
            Err(DomainError::InvalidStatus)
        ));
        assert!(matches!(
            f.svc.update_item_status(item, "pending"),
            Err(DomainError::InvalidStatus)
        ));

        assert_eq!(f.svc.table(f.table.id).unwrap().status, TableStatus::Ordered);
        let order = f.svc.order_detail(submitted.order_id).unwrap();
        assert_eq!(order.items[0].status, ItemStatus::Cooking);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn oversized_cart_is_rejected_without_writes() {
        let f = fixture();
        let banquet = f.svc.create_menu(menu("Banquet", 5_000_000_000_000, true)).unwrap();

        let err = f
            .svc
            .submit_order(f.table.id, vec![line(&banquet, 2_000_000_000)])
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(f.svc.customer_orders(5).unwrap().is_empty());
        assert_eq!(f.svc.table(f.table.id).unwrap().status, TableStatus::Empty);
    }

    #[test]
    fn unknown_menu_is_not_found() {
        let f = fixture();
        let err = f
            .svc
            .submit_order(
                f.table.id,
                vec![OrderItemInput {
                    menu_id: Uuid::new_v4(),
                    quantity: 1,
                    options: vec![],
                }],
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound("Menu")));
    }

    #[test]
    fn inactive_menu_cannot_be_ordered() {
        let f = fixture();
        f.svc
            .update_menu(
                f.steak.id,
                MenuPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        let err = f
            .svc
            .submit_order(f.table.id, vec![line(&f.steak, 1)])
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(f.svc.table(f.table.id).unwrap().status, TableStatus::Empty);
    }

    #[test]
    fn price_edit_does_not_touch_captured_prices() {
        let f = fixture();
        let submitted = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 2)]).unwrap();
        f.svc
            .update_menu(
                f.pasta.id,
                MenuPatch {
                    price: Some(9500),
                    ..Default::default()
                },
            )
            .unwrap();

        let order = f.svc.order_detail(submitted.order_id).unwrap();

        assert_eq!(order.items[0].unit_price, 8000);
        assert_eq!(order.total_amount, 16000);
    }

    #[test]
    fn stale_orders_advance_without_touching_others() {
        let f = fixture();
        let a = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();
        let b = f.svc.submit_order(f.table.id, vec![line(&f.steak, 1)]).unwrap();
        f.svc.update_order_status(b.order_id, "confirmed").unwrap();
        let c = f.svc.submit_order(f.table.id, vec![line(&f.steak, 1)]).unwrap();
        f.svc.settle(f.table.id, "cash".to_string()).unwrap();
        let d = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();

        let moved = f.svc.advance_stale_orders(Duration::zero()).unwrap();

        assert_eq!(moved, 1);
        assert_eq!(f.svc.order_detail(a.order_id).unwrap().status, OrderStatus::Paid);
        assert_eq!(f.svc.order_detail(c.order_id).unwrap().status, OrderStatus::Paid);
        assert_eq!(f.svc.order_detail(d.order_id).unwrap().status, OrderStatus::Cooking);
    }

    #[test]
    fn grace_period_holds_back_fresh_orders() {
        let f = fixture();
        let a = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();

        let moved = f.svc.advance_stale_orders(Duration::hours(1)).unwrap();

        assert_eq!(moved, 0);
        assert_eq!(f.svc.order_detail(a.order_id).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn kitchen_view_skips_drinks_only_orders_and_does_not_mutate() {
        let f = fixture();
        let cola = f.svc.create_menu(menu("Cola", 2000, false)).unwrap();
        let drinks = f.svc.submit_order(f.table.id, vec![line(&cola, 2)]).unwrap();
        let food = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();
        let pending = f.svc.submit_order(f.table.id, vec![line(&f.steak, 1)]).unwrap();
        f.svc.update_order_status(drinks.order_id, "cooking").unwrap();
        f.svc.update_order_status(food.order_id, "cooking").unwrap();

        let board = f.svc.kitchen_orders().unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].id, food.order_id);
        assert_eq!(
            f.svc.order_detail(pending.order_id).unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn table_detail_sums_outstanding_final_amounts() {
        let f = fixture();
        let a = f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();
        f.svc.submit_order(f.table.id, vec![line(&f.steak, 1)]).unwrap();
        f.svc.set_discount(a.order_id, 1000).unwrap();

        let detail = f.svc.table_detail(f.table.id).unwrap();

        assert_eq!(detail.orders.len(), 2);
        assert_eq!(detail.total_amount, 7000 + 12000);
        assert_eq!(detail.menus.len(), 2);
    }

    #[test]
    fn paid_table_can_be_reset_by_staff() {
        let f = fixture();
        assert!(matches!(
            f.svc.update_table_status(f.table.id, "empty").map(|t| t.status),
            Ok(TableStatus::Empty)
        ));
        f.svc.submit_order(f.table.id, vec![line(&f.pasta, 1)]).unwrap();
        assert!(matches!(
            f.svc.update_table_status(f.table.id, "empty"),
            Err(DomainError::InvalidTransition)
        ));
        f.svc.settle(f.table.id, "card".to_string()).unwrap();

        let table = f.svc.update_table_status(f.table.id, "empty").unwrap();

        assert_eq!(table.status, TableStatus::Empty);
    }

    #[test]
    fn duplicate_table_number_is_rejected() {
        let f = fixture();
        let err = f
            .svc
            .create_table(NewTable {
                number: 5,
                seats: 2,
                qr_code: None,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
