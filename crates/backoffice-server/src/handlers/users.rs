//! User account handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use backoffice_core::{Error, RecordId};
use std::sync::Arc;

use super::error_response;
use crate::types::{ChangePasswordRequest, ErrorResponse};
use crate::AppState;

/// Change a user's password.
///
/// Reached through `PATCH /users/{id}` when the body carries
/// `currentPassword`. The stored password is left untouched on 401.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User id")
    ),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed, updated user returned", body = Object),
        (status = 401, description = "Current password is incorrect", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ChangePasswordRequest>,
) -> Response {
    let user_id = RecordId::from(id);
    let result = tokio::task::spawn_blocking(move || {
        state
            .db
            .change_password(&user_id, &req.current_password, &req.new_password)
    })
    .await;

    match result {
        Ok(Ok(user)) => Json(user).into_response(),
        Ok(Err(Error::NotFound { .. })) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("User not found")),
        )
            .into_response(),
        Ok(Err(Error::Unauthorized(_))) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Current password is incorrect")),
        )
            .into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Task panicked: {e}"))),
        )
            .into_response(),
    }
}
