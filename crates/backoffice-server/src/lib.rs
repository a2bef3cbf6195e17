#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]
#![allow(clippy::needless_for_each)]
//! Back-office record store - REST API over a JSON document database.
//!
//! Each top-level collection of the document is exposed as a REST resource.
//! `PATCH /users/{id}` additionally accepts a password change body.
//!
//! ## OpenAPI Documentation
//!
//! - OpenAPI JSON: `GET /api-docs/openapi.json`

mod handlers;
mod types;

use axum::{
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use backoffice_core::Database;
use std::sync::Arc;
use utoipa::OpenApi;

// Re-export types for external use
pub use types::*;

// Re-export handlers for routing
pub use handlers::{
    change_password, create_record, delete_record, get_record, health_check, list_records,
    patch_record, replace_record,
};

// ============================================================================
// OpenAPI Documentation
// ============================================================================

/// Record store API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Back-office Record Store API",
        version = "0.3.0",
        description = "JSON document store serving shop collections \
            (products, orders, users, marketing) as REST resources.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "records", description = "Collection CRUD"),
        (name = "users", description = "User account operations")
    ),
    paths(
        handlers::health::health_check,
        handlers::records::list_records,
        handlers::records::get_record,
        handlers::records::create_record,
        handlers::records::replace_record,
        handlers::records::patch_record,
        handlers::records::delete_record,
        handlers::users::change_password
    ),
    components(
        schemas(ErrorResponse, ChangePasswordRequest, HealthResponse)
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// Application State
// ============================================================================

/// Application state shared across handlers.
pub struct AppState {
    /// The record store.
    pub db: Database,
}

/// Builds the API router.
///
/// Layers (CORS, tracing, body limit) are left to the caller.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/{collection}", get(list_records).post(create_record))
        .route(
            "/{collection}/{id}",
            get(get_record)
                .put(replace_record)
                .patch(patch_record)
                .delete(delete_record),
        )
        .with_state(state)
}

// ============================================================================
// Tests
// ============================================================================
