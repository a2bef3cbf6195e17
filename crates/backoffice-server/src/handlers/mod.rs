//! HTTP handlers for the record store REST API.
//!
//! - `health`: Health check endpoint
//! - `records`: Generic collection CRUD
//! - `users`: Password change

pub mod health;
pub mod records;
pub mod users;

pub use health::health_check;
pub use records::{
    create_record, delete_record, get_record, list_records, patch_record, replace_record,
};
pub use users::change_password;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use backoffice_core::Error;
use serde::Serialize;

use crate::types::ErrorResponse;

/// HTTP status for a store error.
pub(crate) fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotFound { .. } | Error::CollectionNotFound(_) => StatusCode::NOT_FOUND,
        Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        Error::DuplicateId(_) => StatusCode::CONFLICT,
        Error::ValidationFailed(_) | Error::MissingId(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(err: &Error) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!(code = err.code(), error = %err, "request failed");
    }
    (status, Json(ErrorResponse::new(err.to_string()))).into_response()
}

/// Runs a store call off the async runtime; writes may hit the disk.
pub(crate) async fn run_blocking<T, F>(status: StatusCode, f: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> backoffice_core::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => (status, Json(value)).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Task panicked: {e}"))),
        )
            .into_response(),
    }
}
