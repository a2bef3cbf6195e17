//! Generic collection handlers.
//!
//! Every top-level key of the database document is served as a REST
//! resource: `/{collection}` and `/{collection}/{id}`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use backoffice_core::store::USERS_COLLECTION;
use backoffice_core::{Record, RecordId};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{error_response, run_blocking, users};
use crate::types::{ChangePasswordRequest, ErrorResponse};
use crate::AppState;

/// Body key that turns a user PATCH into a password change.
const CURRENT_PASSWORD_KEY: &str = "currentPassword";

/// List the records of a collection.
///
/// Every query parameter is an exact-match filter on the string form of the
/// field. Parameters starting with `_` are reserved and ignored.
#[utoipa::path(
    get,
    path = "/{collection}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "Collection name")
    ),
    responses(
        (status = 200, description = "Matching records", body = [Object]),
        (status = 404, description = "Collection not found", body = ErrorResponse)
    )
)]
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let filters: Vec<(String, String)> = params
        .into_iter()
        .filter(|(field, _)| !field.starts_with('_'))
        .collect();

    match state.db.list(&collection, &filters) {
        Ok(records) => Json(records).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Get one record.
#[utoipa::path(
    get,
    path = "/{collection}/{id}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record found", body = Object),
        (status = 404, description = "Record or collection not found", body = ErrorResponse)
    )
)]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    match state.db.get(&collection, &RecordId::from(id)) {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Create a record. An id is assigned when the body has none.
#[utoipa::path(
    post,
    path = "/{collection}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "Collection name")
    ),
    request_body = Object,
    responses(
        (status = 201, description = "Record created", body = Object),
        (status = 404, description = "Collection not found", body = ErrorResponse),
        (status = 409, description = "Id already taken", body = ErrorResponse)
    )
)]
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Json(record): Json<Record>,
) -> Response {
    run_blocking(StatusCode::CREATED, move || state.db.insert(&collection, record)).await
}

/// Replace a record.
#[utoipa::path(
    put,
    path = "/{collection}/{id}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Record replaced", body = Object),
        (status = 404, description = "Record or collection not found", body = ErrorResponse)
    )
)]
pub async fn replace_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(record): Json<Record>,
) -> Response {
    run_blocking(StatusCode::OK, move || {
        state.db.replace(&collection, &RecordId::from(id), record)
    })
    .await
}

/// Shallow-merge fields into a record.
///
/// On `users`, a body carrying `currentPassword` is a password change
/// instead, see [`users::change_password`].
#[utoipa::path(
    patch,
    path = "/{collection}/{id}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Record updated", body = Object),
        (status = 404, description = "Record or collection not found", body = ErrorResponse)
    )
)]
pub async fn patch_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(patch): Json<Map<String, Value>>,
) -> Response {
    if collection == USERS_COLLECTION && patch.contains_key(CURRENT_PASSWORD_KEY) {
        return match serde_json::from_value::<ChangePasswordRequest>(Value::Object(patch)) {
            Ok(req) => users::change_password(State(state), Path(id), Json(req))
                .await
                .into_response(),
            Err(e) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Invalid password change: {e}"))),
            )
                .into_response(),
        };
    }

    run_blocking(StatusCode::OK, move || {
        state.db.merge(&collection, &RecordId::from(id), &patch)
    })
    .await
}

/// Delete a record.
#[utoipa::path(
    delete,
    path = "/{collection}/{id}",
    tag = "records",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record deleted", body = Object),
        (status = 404, description = "Record or collection not found", body = ErrorResponse)
    )
)]
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    run_blocking(StatusCode::OK, move || {
        state
            .db
            .delete(&collection, &RecordId::from(id))
            .map(|_| Map::new())
    })
    .await
}
