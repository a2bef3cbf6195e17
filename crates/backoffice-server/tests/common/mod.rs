//! Common test utilities for backoffice-server integration tests.

use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;

use backoffice_core::Database;
use backoffice_server::{router, AppState};

/// Shop fixture shaped like the dashboard's `db.json`.
pub fn fixture() -> Value {
    json!({
        "users": [
            {"id": 1, "email": "admin@shop.test", "full_name": "Ada Admin", "password": "admin123", "role": "admin"},
            {"id": 2, "email": "carla@shop.test", "full_name": "Carla Customer", "password": "pa55", "role": "customer"}
        ],
        "categories": [
            {"id": 1, "name": "Clothing", "parent_id": null},
            {"id": 2, "name": "Shirts", "parent_id": 1}
        ],
        "products": [
            {"id": 1, "name": "Linen Shirt", "category_id": 2, "price": 49.9},
            {"id": 2, "name": "Canvas Tote", "category_id": 99, "price": 15}
        ],
        "orders": [
            {"id": 1, "user_id": 2, "status": "pending", "total": 64.9},
            {"id": 2, "user_id": 7, "status": "shipped", "total": 15}
        ],
        "order_items": [
            {"id": 1, "order_id": 1, "product_id": 1, "quantity": 1},
            {"id": 2, "order_id": 1, "product_id": 2, "quantity": 1}
        ]
    })
}

/// Creates the API router over an in-memory copy of [`fixture`].
pub fn create_test_app() -> Router {
    let db = Database::from_value(fixture()).expect("Failed to load fixture");
    router(Arc::new(AppState { db }))
}
