use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::menu::{MenuPatch, MenuView, NewMenu};
use crate::errors::AppError;
use crate::AppService;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuRequest {
    pub name: String,
    pub price: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub requires_cooking: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMenuRequest {
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuResponse {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub is_active: bool,
    pub requires_cooking: bool,
}

impl From<MenuView> for MenuResponse {
    fn from(menu: MenuView) -> Self {
        MenuResponse {
            id: menu.id,
            name: menu.name,
            price: menu.price,
            is_active: menu.is_active,
            requires_cooking: menu.requires_cooking,
        }
    }
}

/// GET /menus
///
/// Active menus ordered by name.
#[utoipa::path(
    get,
    path = "/menus",
    responses(
        (status = 200, description = "Active menus", body = [MenuResponse]),
    ),
    tag = "menus"
)]
pub async fn list_menus(svc: web::Data<AppService>) -> Result<HttpResponse, AppError> {
    let menus = web::block(move || svc.active_menus()).await??;
    let body: Vec<MenuResponse> = menus.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /menus
#[utoipa::path(
    post,
    path = "/menus",
    request_body = CreateMenuRequest,
    responses(
        (status = 201, description = "Menu created", body = MenuResponse),
        (status = 400, description = "Empty name or negative price"),
    ),
    tag = "menus"
)]
pub async fn create_menu(
    svc: web::Data<AppService>,
    body: web::Json<CreateMenuRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let menu = NewMenu {
        name: body.name,
        price: body.price,
        is_active: body.is_active,
        requires_cooking: body.requires_cooking,
    };
    let created = web::block(move || svc.create_menu(menu)).await??;
    Ok(HttpResponse::Created().json(MenuResponse::from(created)))
}

/// PATCH /menus/{id}
///
/// Price and availability edits. Prices already captured on order items are
/// not affected.
#[utoipa::path(
    patch,
    path = "/menus/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu UUID"),
    ),
    request_body = UpdateMenuRequest,
    responses(
        (status = 200, description = "Menu updated", body = MenuResponse),
        (status = 400, description = "Negative price"),
        (status = 404, description = "Menu not found"),
    ),
    tag = "menus"
)]
pub async fn update_menu(
    svc: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateMenuRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let patch = MenuPatch {
        price: body.price,
        is_active: body.is_active,
    };
    let updated = web::block(move || svc.update_menu(id, patch)).await??;
    Ok(HttpResponse::Ok().json(MenuResponse::from(updated)))
}
