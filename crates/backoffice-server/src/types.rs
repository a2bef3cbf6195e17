//! Request/Response types for the record store REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

impl ErrorResponse {
    /// Wraps a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Password change body for `PATCH /users/{id}`.
///
/// Field names follow the JavaScript convention of the dashboard pages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Password currently stored for the user.
    #[schema(example = "old-secret")]
    pub current_password: String,
    /// Replacement password.
    #[schema(example = "new-secret")]
    pub new_password: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"`.
    pub status: String,
    /// Server version.
    pub version: String,
}
