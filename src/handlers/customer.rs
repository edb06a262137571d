//! Table-side terminal endpoints. Tables are addressed by their printed
//! number rather than their id.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{OrderItemView, OrderView};
use crate::domain::status::{ItemStatus, OrderStatus};
use crate::errors::AppError;
use crate::AppService;

use super::menus::MenuResponse;
use super::orders::{SubmitOrderRequest, SubmitOrderResponse};
use super::tables::TableResponse;

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerMenuResponse {
    pub table: TableResponse,
    pub menus: Vec<MenuResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PolledItem {
    pub id: Uuid,
    pub menu_name: String,
    pub quantity: i32,
    #[schema(value_type = Vec<Object>)]
    pub options: Vec<Value>,
    pub total_price: i64,
    pub status: ItemStatus,
}

impl From<OrderItemView> for PolledItem {
    fn from(item: OrderItemView) -> Self {
        PolledItem {
            total_price: item.line_total(),
            id: item.id,
            menu_name: item.menu_name,
            quantity: item.quantity,
            options: item.options,
            status: item.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PolledOrder {
    pub id: Uuid,
    pub status: OrderStatus,
    pub status_display: String,
    /// Amount due for this order after its discount.
    pub total_amount: i64,
    pub created_at: String,
    pub items: Vec<PolledItem>,
}

impl From<OrderView> for PolledOrder {
    fn from(order: OrderView) -> Self {
        PolledOrder {
            total_amount: order.final_amount(),
            status_display: order.status.label().to_string(),
            created_at: order.created_at.format(CREATED_AT_FORMAT).to_string(),
            id: order.id,
            status: order.status,
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PollOrdersResponse {
    pub orders: Vec<PolledOrder>,
}

/// GET /customer/{number}/menu
#[utoipa::path(
    get,
    path = "/customer/{number}/menu",
    params(
        ("number" = i32, Path, description = "Table number"),
    ),
    responses(
        (status = 200, description = "Table and orderable menus", body = CustomerMenuResponse),
        (status = 404, description = "Table not found"),
    ),
    tag = "customer"
)]
pub async fn customer_menu(
    svc: web::Data<AppService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let number = path.into_inner();
    let (table, menus) = web::block(move || svc.customer_menu(number)).await??;

    Ok(HttpResponse::Ok().json(CustomerMenuResponse {
        table: table.into(),
        menus: menus.into_iter().map(Into::into).collect(),
    }))
}

/// POST /customer/{number}/orders
#[utoipa::path(
    post,
    path = "/customer/{number}/orders",
    params(
        ("number" = i32, Path, description = "Table number"),
    ),
    request_body = SubmitOrderRequest,
    responses(
        (status = 200, description = "Order created", body = SubmitOrderResponse),
        (status = 400, description = "Empty cart, bad quantity or unavailable menu"),
        (status = 404, description = "Table or menu not found"),
    ),
    tag = "customer"
)]
pub async fn submit_customer_order(
    svc: web::Data<AppService>,
    path: web::Path<i32>,
    body: web::Json<SubmitOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let number = path.into_inner();
    let items = body.into_inner().into_items();
    let submitted = web::block(move || svc.submit_customer_order(number, items)).await??;

    Ok(HttpResponse::Ok().json(SubmitOrderResponse {
        success: true,
        order_id: submitted.order_id,
        total_amount: submitted.total_amount,
    }))
}

/// GET /customer/{number}/orders
///
/// Polled by the table terminal. Unpaid orders, newest first.
#[utoipa::path(
    get,
    path = "/customer/{number}/orders",
    params(
        ("number" = i32, Path, description = "Table number"),
    ),
    responses(
        (status = 200, description = "Unpaid orders of the table", body = PollOrdersResponse),
        (status = 404, description = "Table not found"),
    ),
    tag = "customer"
)]
pub async fn poll_orders(
    svc: web::Data<AppService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let number = path.into_inner();
    let orders = web::block(move || svc.customer_orders(number)).await??;

    Ok(HttpResponse::Ok().json(PollOrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}
