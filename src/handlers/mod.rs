pub mod customer;
pub mod menus;
pub mod orders;
pub mod tables;

use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

use crate::errors::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        menus::list_menus,
        menus::create_menu,
        menus::update_menu,
        tables::list_tables,
        tables::create_table,
        tables::table_detail,
        tables::update_table_status,
        tables::submit_order,
        tables::process_payment,
        customer::customer_menu,
        customer::submit_customer_order,
        customer::poll_orders,
        orders::kitchen_orders,
        orders::get_order,
        orders::update_order_status,
        orders::set_discount,
        orders::update_item_status,
    ),
    tags(
        (name = "menus", description = "Menu catalogue"),
        (name = "tables", description = "Staff dashboard and payment"),
        (name = "customer", description = "Table-side ordering terminal"),
        (name = "orders", description = "Kitchen board and order status"),
    )
)]
pub struct ApiDoc;

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up"),
    )
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed bodies get the same `{success, error}` envelope as every other
/// rejection.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .service(
            web::scope("/menus")
                .route("", web::get().to(menus::list_menus))
                .route("", web::post().to(menus::create_menu))
                .route("/{id}", web::patch().to(menus::update_menu)),
        )
        .service(
            web::scope("/tables")
                .route("", web::get().to(tables::list_tables))
                .route("", web::post().to(tables::create_table))
                .route("/{id}", web::get().to(tables::table_detail))
                .route("/{id}/status", web::post().to(tables::update_table_status))
                .route("/{id}/orders", web::post().to(tables::submit_order))
                .route("/{id}/payment", web::post().to(tables::process_payment)),
        )
        .service(
            web::scope("/customer/{number}")
                .route("/menu", web::get().to(customer::customer_menu))
                .route("/orders", web::get().to(customer::poll_orders))
                .route("/orders", web::post().to(customer::submit_customer_order)),
        )
        .service(
            web::scope("/orders")
                .route("", web::get().to(orders::kitchen_orders))
                .route("/{id}", web::get().to(orders::get_order))
                .route("/{id}/status", web::post().to(orders::update_order_status))
                .route("/{id}/discount", web::post().to(orders::set_discount)),
        )
        .route(
            "/order-items/{id}/status",
            web::post().to(orders::update_item_status),
        );
}
