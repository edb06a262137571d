use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::status::TableStatus;
use crate::domain::table::{NewTable, TableView, DEFAULT_SEATS};
use crate::errors::AppError;
use crate::AppService;

use super::menus::MenuResponse;
use super::orders::{OrderResponse, StatusRequest, SubmitOrderRequest, SubmitOrderResponse};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub number: i32,
    #[serde(default = "default_seats")]
    pub seats: i32,
    /// Reference to an externally generated QR-code image.
    pub qr_code: Option<String>,
}

fn default_seats() -> i32 {
    DEFAULT_SEATS
}

/// Compact row used by the dashboard's status polling.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableSummary {
    pub id: Uuid,
    pub number: i32,
    pub status: TableStatus,
    pub seats: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableResponse {
    pub id: Uuid,
    pub number: i32,
    pub seats: i32,
    pub status: TableStatus,
    pub status_display: String,
    pub qr_code: Option<String>,
}

impl From<TableView> for TableResponse {
    fn from(table: TableView) -> Self {
        TableResponse {
            status_display: table.status.label().to_string(),
            id: table.id,
            number: table.number,
            seats: table.seats,
            status: table.status,
            qr_code: table.qr_code,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableDetailResponse {
    pub table: TableResponse,
    pub orders: Vec<OrderResponse>,
    pub menus: Vec<MenuResponse>,
    /// Outstanding amount after discounts.
    pub total_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableStatusResponse {
    pub success: bool,
    pub status: TableStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub success: bool,
    pub payment_method: String,
    pub total_amount: i64,
    pub message: String,
    pub settled_orders: Vec<Uuid>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /tables
#[utoipa::path(
    get,
    path = "/tables",
    responses(
        (status = 200, description = "All tables ordered by number", body = [TableSummary]),
    ),
    tag = "tables"
)]
pub async fn list_tables(svc: web::Data<AppService>) -> Result<HttpResponse, AppError> {
    let tables = web::block(move || svc.list_tables()).await??;
    let body: Vec<TableSummary> = tables
        .into_iter()
        .map(|t| TableSummary {
            id: t.id,
            number: t.number,
            status: t.status,
            seats: t.seats,
        })
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /tables
#[utoipa::path(
    post,
    path = "/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table registered", body = TableResponse),
        (status = 400, description = "Duplicate number or invalid seat count"),
    ),
    tag = "tables"
)]
pub async fn create_table(
    svc: web::Data<AppService>,
    body: web::Json<CreateTableRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let table = NewTable {
        number: body.number,
        seats: body.seats,
        qr_code: body.qr_code,
    };
    let created = web::block(move || svc.create_table(table)).await??;
    Ok(HttpResponse::Created().json(TableResponse::from(created)))
}

/// GET /tables/{id}
///
/// The table with its unpaid orders (newest first), the orderable menus and
/// the outstanding total.
#[utoipa::path(
    get,
    path = "/tables/{id}",
    params(
        ("id" = Uuid, Path, description = "Table UUID"),
    ),
    responses(
        (status = 200, description = "Table found", body = TableDetailResponse),
        (status = 404, description = "Table not found"),
    ),
    tag = "tables"
)]
pub async fn table_detail(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let detail = web::block(move || svc.table_detail(id)).await??;

    Ok(HttpResponse::Ok().json(TableDetailResponse {
        table: detail.table.into(),
        orders: detail.orders.into_iter().map(Into::into).collect(),
        menus: detail.menus.into_iter().map(Into::into).collect(),
        total_amount: detail.total_amount,
    }))
}

/// POST /tables/{id}/status
#[utoipa::path(
    post,
    path = "/tables/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Table UUID"),
    ),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status stored, or `success: false` for an invalid status or transition", body = TableStatusResponse),
        (status = 404, description = "Table not found"),
    ),
    tag = "tables"
)]
pub async fn update_table_status(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = body.into_inner().into_status();
    let table = web::block(move || svc.update_table_status(id, &status)).await??;

    Ok(HttpResponse::Ok().json(TableStatusResponse {
        success: true,
        status: table.status,
    }))
}

/// POST /tables/{id}/orders
///
/// Staff terminal order entry.
#[utoipa::path(
    post,
    path = "/tables/{id}/orders",
    params(
        ("id" = Uuid, Path, description = "Table UUID"),
    ),
    request_body = SubmitOrderRequest,
    responses(
        (status = 200, description = "Order created", body = SubmitOrderResponse),
        (status = 400, description = "Empty cart, bad quantity or unavailable menu"),
        (status = 404, description = "Table or menu not found"),
    ),
    tag = "tables"
)]
pub async fn submit_order(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<SubmitOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let table_id = path.into_inner();
    let items = body.into_inner().into_items();
    let submitted = web::block(move || svc.submit_order(table_id, items)).await??;

    Ok(HttpResponse::Ok().json(SubmitOrderResponse {
        success: true,
        order_id: submitted.order_id,
        total_amount: submitted.total_amount,
    }))
}

/// POST /tables/{id}/payment
///
/// Settles every unpaid order of the table in one step.
#[utoipa::path(
    post,
    path = "/tables/{id}/payment",
    params(
        ("id" = Uuid, Path, description = "Table UUID"),
    ),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Table settled", body = PaymentResponse),
        (status = 404, description = "Table not found"),
    ),
    tag = "tables"
)]
pub async fn process_payment(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<PaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let table_id = path.into_inner();
    let payment_method = body.into_inner().payment_method;
    let receipt = web::block(move || svc.settle(table_id, payment_method)).await??;

    Ok(HttpResponse::Ok().json(PaymentResponse {
        success: true,
        message: receipt.message(),
        payment_method: receipt.payment_method,
        total_amount: receipt.total_amount,
        settled_orders: receipt.settled_orders,
    }))
}
