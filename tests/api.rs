//! HTTP tests against a server backed by in-memory storage.
//!
//! Each test binds its own server on an ephemeral port, so they run in
//! parallel without any external infrastructure.

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::web;
use front_of_house::application::restaurant_service::RestaurantService;
use front_of_house::build_server;
use front_of_house::domain::ports::RestaurantRepository;
use front_of_house::infrastructure::memory_repo::InMemoryRepository;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

struct TestApp {
    base: String,
    http: Client,
}

impl TestApp {
    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .expect("request failed");
        let status = resp.status();
        (status, resp.json().await.expect("body is not JSON"))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .http
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .expect("request failed");
        let status = resp.status();
        (status, resp.json().await.expect("body is not JSON"))
    }

    async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .http
            .patch(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .expect("request failed");
        let status = resp.status();
        (status, resp.json().await.expect("body is not JSON"))
    }

    /// Table 5 with a pasta (8000) and a steak (12000) on the menu.
    async fn seed(&self) -> Seed {
        let (status, table) = self.post("/tables", json!({ "number": 5 })).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, pasta) = self
            .post("/menus", json!({ "name": "Pasta", "price": 8000 }))
            .await;
        let (_, steak) = self
            .post("/menus", json!({ "name": "Steak", "price": 12000 }))
            .await;
        Seed {
            table_id: table["id"].as_str().unwrap().to_string(),
            pasta_id: pasta["id"].as_str().unwrap().to_string(),
            steak_id: steak["id"].as_str().unwrap().to_string(),
        }
    }

    /// One pasta and two steaks, 32000 in total.
    async fn order_for_table_5(&self, seed: &Seed) -> String {
        let (status, body) = self
            .post(
                "/customer/5/orders",
                json!({
                    "items": [
                        { "menu_id": seed.pasta_id, "quantity": 1, "options": ["extra cheese"] },
                        { "menu_id": seed.steak_id, "quantity": 2 }
                    ]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["order_id"].as_str().unwrap().to_string()
    }
}

struct Seed {
    table_id: String,
    pasta_id: String,
    steak_id: String,
}

async fn spawn_app() -> TestApp {
    let repo: Arc<dyn RestaurantRepository> = Arc::new(InMemoryRepository::new());
    let service = web::Data::new(RestaurantService::new(repo));
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let port = listener.local_addr().expect("addr failed").port();

    let server = build_server(service, listener).expect("Failed to build server");
    tokio::spawn(server);

    TestApp {
        base: format!("http://127.0.0.1:{}", port),
        http: Client::new(),
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn customer_order_totals_and_marks_table_ordered() {
    let app = spawn_app().await;
    let seed = app.seed().await;

    let (_, body) = app
        .post(
            "/customer/5/orders",
            json!({
                "items": [
                    { "menu_id": seed.pasta_id, "quantity": 1 },
                    { "menu_id": seed.steak_id, "quantity": 2 }
                ]
            }),
        )
        .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["total_amount"], 32000);

    let (_, tables) = app.get("/tables").await;
    assert_eq!(tables[0]["number"], 5);
    assert_eq!(tables[0]["status"], "ordered");
}

#[tokio::test]
async fn discounted_table_settles_in_one_payment() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;

    let (status, order) = app
        .post(
            &format!("/orders/{}/discount", order_id),
            json!({ "discount": 2000 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["final_amount"], 30000);

    let (status, receipt) = app
        .post(
            &format!("/tables/{}/payment", seed.table_id),
            json!({ "payment_method": "card" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["success"], true);
    assert_eq!(receipt["total_amount"], 30000);
    assert_eq!(receipt["message"], "card payment completed.");
    assert_eq!(receipt["settled_orders"], json!([order_id]));

    let (_, order) = app.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(order["status"], "paid");
    let (_, detail) = app.get(&format!("/tables/{}", seed.table_id)).await;
    assert_eq!(detail["table"]["status"], "paid");
    assert_eq!(detail["orders"], json!([]));
    assert_eq!(detail["total_amount"], 0);
}

#[tokio::test]
async fn unknown_status_is_reported_in_the_body() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;

    let (status, body) = app
        .post(
            &format!("/orders/{}/status", order_id),
            json!({ "status": "burnt" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Invalid status" }));
    let (_, order) = app.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
async fn disallowed_transition_is_reported_in_the_body() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;

    let (status, body) = app
        .post(
            &format!("/orders/{}/status", order_id),
            json!({ "status": "served" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid transition");
}

#[tokio::test]
async fn last_ready_item_moves_order_to_ready_and_table_to_cooking() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;
    let (_, order) = app.get(&format!("/orders/{}", order_id)).await;
    let item_ids: Vec<String> = order["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect();

    let (_, first) = app
        .post(
            &format!("/order-items/{}/status", item_ids[0]),
            json!({ "status": "ready" }),
        )
        .await;
    assert_eq!(first["success"], true);
    assert_eq!(first["order_status"], "pending");

    let (_, last) = app
        .post(
            &format!("/order-items/{}/status", item_ids[1]),
            json!({ "status": "ready" }),
        )
        .await;
    assert_eq!(last["status"], "ready");
    assert_eq!(last["order_status"], "ready");
    assert_eq!(last["table_status"], "cooking");

    let (_, tables) = app.get("/tables").await;
    assert_eq!(tables[0]["status"], "cooking");
}

#[tokio::test]
async fn polling_returns_unpaid_orders_with_item_detail() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;

    let (status, body) = app.get("/customer/5/orders").await;

    assert_eq!(status, StatusCode::OK);
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order["id"], order_id.as_str());
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], 32000);
    // "YYYY-MM-DD HH:MM"
    assert_eq!(order["created_at"].as_str().unwrap().len(), 16);

    let items = order["items"].as_array().unwrap();
    let pasta = items.iter().find(|i| i["menu_name"] == "Pasta").unwrap();
    assert_eq!(pasta["quantity"], 1);
    assert_eq!(pasta["total_price"], 8000);
    assert_eq!(pasta["options"], json!(["extra cheese"]));
    assert_eq!(pasta["status"], "cooking");
    let steak = items.iter().find(|i| i["menu_name"] == "Steak").unwrap();
    assert_eq!(steak["total_price"], 24000);
}

#[tokio::test]
async fn kitchen_board_lists_cooking_orders_only() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let waiting = app.order_for_table_5(&seed).await;
    let cooking = app.order_for_table_5(&seed).await;

    let (_, board) = app.get("/orders").await;
    assert_eq!(board, json!([]));

    app.post(
        &format!("/orders/{}/status", cooking),
        json!({ "status": "cooking" }),
    )
    .await;
    let (_, board) = app.get("/orders").await;

    let ids: Vec<&str> = board
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![cooking.as_str()]);
    assert_ne!(ids[0], waiting.as_str());
    assert_eq!(board[0]["table_number"], 5);
}

#[tokio::test]
async fn menu_price_change_keeps_captured_prices() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;

    let (status, menu) = app
        .patch(&format!("/menus/{}", seed.pasta_id), json!({ "price": 9000 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu["price"], 9000);

    let (_, order) = app.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(order["total_amount"], 32000);
}

#[tokio::test]
async fn unknown_table_and_order_are_not_found() {
    let app = spawn_app().await;

    let (status, body) = app.get("/customer/42/menu").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Table not found" }));

    let (status, body) = app
        .get("/orders/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order not found");
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let app = spawn_app().await;
    app.seed().await;

    let (status, body) = app.post("/customer/5/orders", json!({ "items": [] })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = spawn_app().await;

    let resp = app
        .http
        .post(format!("{}/menus", app.base))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("body is not JSON");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn customer_menu_lists_active_menus_only() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    app.patch(
        &format!("/menus/{}", seed.steak_id),
        json!({ "is_active": false }),
    )
    .await;

    let (status, body) = app.get("/customer/5/menu").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table"]["number"], 5);
    let names: Vec<&str> = body["menus"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Pasta"]);
}

#[tokio::test]
async fn unknown_table_status_leaves_table_unchanged() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    app.order_for_table_5(&seed).await;

    let (status, body) = app
        .post(
            &format!("/tables/{}/status", seed.table_id),
            json!({ "status": "closed" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Invalid status" }));
    let (_, detail) = app.get(&format!("/tables/{}", seed.table_id)).await;
    assert_eq!(detail["table"]["status"], "ordered");
}

#[tokio::test]
async fn unknown_item_status_leaves_item_unchanged() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;
    let (_, order) = app.get(&format!("/orders/{}", order_id)).await;
    let item_id = order["items"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &format!("/order-items/{}/status", item_id),
            json!({ "status": "served" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Invalid status" }));
    let (_, order) = app.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(order["items"][0]["status"], "cooking");
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
async fn missing_or_non_string_status_is_an_invalid_status() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;

    for body in [json!({}), json!({ "status": 3 }), json!({ "status": null })] {
        let (status, reply) = app
            .post(&format!("/orders/{}/status", order_id), body)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, json!({ "success": false, "error": "Invalid status" }));
    }

    let (_, order) = app.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
async fn explicit_paid_order_moves_table_to_paid() {
    let app = spawn_app().await;
    let seed = app.seed().await;
    let order_id = app.order_for_table_5(&seed).await;

    let (status, body) = app
        .post(
            &format!("/orders/{}/status", order_id),
            json!({ "status": "paid" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["table_status"], "paid");
    let (_, tables) = app.get("/tables").await;
    assert_eq!(tables[0]["status"], "paid");
}

#[tokio::test]
async fn oversized_cart_is_a_bad_request() {
    let app = spawn_app().await;
    app.seed().await;
    let (_, banquet) = app
        .post(
            "/menus",
            json!({ "name": "Banquet", "price": 5_000_000_000_000i64 }),
        )
        .await;

    let (status, body) = app
        .post(
            "/customer/5/orders",
            json!({ "items": [{ "menu_id": banquet["id"], "quantity": 2_000_000_000 }] }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let (_, polled) = app.get("/customer/5/orders").await;
    assert_eq!(polled["orders"], json!([]));
    let (_, tables) = app.get("/tables").await;
    assert_eq!(tables[0]["status"], "empty");
}
