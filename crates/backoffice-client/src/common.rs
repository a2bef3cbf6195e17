//! HTTP plumbing shared by the record store client.

use backoffice_core::{ClientConfig, Error, RecordId};
use reqwest::Client;
use std::time::Duration;

/// Creates an HTTP client with the configured timeouts.
#[must_use]
pub fn create_http_client(config: &ClientConfig) -> Client {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Extracts the message of an `{"error": "..."}` body, else the raw body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Maps a non-success response to an error.
///
/// `target` names the record a single-record call addressed; a 404 on such
/// a call is [`Error::NotFound`], elsewhere it is a failed fetch.
pub fn handle_http_error(status_code: u16, body: &str, target: Option<(&str, &RecordId)>) -> Error {
    match (status_code, target) {
        (400, _) => Error::ValidationFailed(error_message(body)),
        (401, _) => Error::Unauthorized(error_message(body)),
        (404, Some((collection, id))) => Error::not_found(collection, id.as_str()),
        (409, _) => Error::DuplicateId(error_message(body)),
        _ => Error::FetchFailed(format!("HTTP {status_code}: {}", error_message(body))),
    }
}
