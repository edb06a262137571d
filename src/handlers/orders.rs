use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{OrderItemInput, OrderItemView, OrderView};
use crate::domain::status::{ItemStatus, OrderStatus, TableStatus};
use crate::errors::AppError;
use crate::AppService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub menu_id: Uuid,
    pub quantity: i32,
    /// Free-form selections, e.g. `["extra cheese", {"spice": 2}]`.
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub options: Vec<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

impl SubmitOrderRequest {
    pub fn into_items(self) -> Vec<OrderItemInput> {
        self.items
            .into_iter()
            .map(|i| OrderItemInput {
                menu_id: i.menu_id,
                quantity: i.quantity,
                options: i.options,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitOrderResponse {
    pub success: bool,
    pub order_id: Uuid,
    pub total_amount: i64,
}

/// Body of every status-update endpoint. The value is checked against the
/// target entity's status set by the service, so unknown strings reach it.
/// A missing or non-string value counts as an unknown status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    #[serde(default)]
    #[schema(value_type = String)]
    pub status: Value,
}

impl StatusRequest {
    pub fn into_status(self) -> String {
        match self.status {
            Value::String(status) => status,
            _ => String::new(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatusResponse {
    pub success: bool,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_status: Option<TableStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemStatusResponse {
    pub success: bool,
    pub status: ItemStatus,
    pub order_status: OrderStatus,
    pub table_status: TableStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DiscountRequest {
    pub discount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub menu_name: String,
    pub quantity: i32,
    #[schema(value_type = Vec<Object>)]
    pub options: Vec<Value>,
    pub unit_price: i64,
    pub total_price: i64,
    pub status: ItemStatus,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        OrderItemResponse {
            total_price: item.line_total(),
            id: item.id,
            menu_id: item.menu_id,
            menu_name: item.menu_name,
            quantity: item.quantity,
            options: item.options,
            unit_price: item.unit_price,
            status: item.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub table_id: Uuid,
    pub table_number: i32,
    pub status: OrderStatus,
    pub status_display: String,
    pub total_amount: i64,
    pub discount: i64,
    pub final_amount: i64,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            final_amount: order.final_amount(),
            status_display: order.status.label().to_string(),
            id: order.id,
            table_id: order.table_id,
            table_number: order.table_number,
            status: order.status,
            total_amount: order.total_amount,
            discount: order.discount,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Kitchen board: cooking/ready orders that contain at least one item which
/// needs the kitchen, oldest first. Reading it never changes any status.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders in the kitchen", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn kitchen_orders(svc: web::Data<AppService>) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || svc.kitchen_orders()).await??;
    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let order = web::block(move || svc.order_detail(id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /orders/{id}/status
///
/// Staff status change. `ready` also moves the table to `cooking`, `paid`
/// moves it to `paid`.
#[utoipa::path(
    post,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status stored, or `success: false` for an invalid status or transition", body = OrderStatusResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = body.into_inner().into_status();
    let change = web::block(move || svc.update_order_status(id, &status)).await??;

    Ok(HttpResponse::Ok().json(OrderStatusResponse {
        success: true,
        status: change.status,
        table_status: change.table_status,
    }))
}

/// POST /orders/{id}/discount
#[utoipa::path(
    post,
    path = "/orders/{id}/discount",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = DiscountRequest,
    responses(
        (status = 200, description = "Discount applied", body = OrderResponse),
        (status = 400, description = "Negative discount or discount above the order total"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn set_discount(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<DiscountRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let discount = body.into_inner().discount;
    let order = web::block(move || svc.set_discount(id, discount)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /order-items/{id}/status
///
/// Kitchen marks a single item. When the last item of an order turns
/// `ready`, the order becomes `ready` and its table `cooking`.
#[utoipa::path(
    post,
    path = "/order-items/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order item UUID"),
    ),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status stored, or `success: false` for an invalid status", body = ItemStatusResponse),
        (status = 404, description = "Order item not found"),
    ),
    tag = "orders"
)]
pub async fn update_item_status(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = body.into_inner().into_status();
    let change = web::block(move || svc.update_item_status(id, &status)).await??;

    Ok(HttpResponse::Ok().json(ItemStatusResponse {
        success: true,
        status: change.status,
        order_status: change.order_status,
        table_status: change.table_status,
    }))
}
