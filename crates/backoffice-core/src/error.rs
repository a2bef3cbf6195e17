//! Error types for the back-office toolkit.
//!
//! One error type is shared by the grid engine, the join layer, the record
//! store and the resource client, so a page can handle every failure of a
//! load-then-display cycle in one place.

use thiserror::Error;

/// Result type alias for back-office operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in back-office operations.
///
/// Error codes follow the pattern `BKO-XXX` for easy debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced record is absent (BKO-001).
    #[error("[BKO-001] Record '{id}' not found in '{collection}'")]
    NotFound {
        /// Collection that was searched.
        collection: String,
        /// Identifier that did not match.
        id: String,
    },

    /// Network or transport failure while talking to the record store (BKO-002).
    #[error("[BKO-002] Fetch failed: {0}")]
    FetchFailed(String),

    /// Request payload rejected (BKO-003).
    #[error("[BKO-003] Validation failed: {0}")]
    ValidationFailed(String),

    /// Credential check failed (BKO-004).
    #[error("[BKO-004] Unauthorized: {0}")]
    Unauthorized(String),

    /// Collection not found (BKO-005).
    #[error("[BKO-005] Collection '{0}' not found")]
    CollectionNotFound(String),

    /// Two records share one identifier (BKO-006).
    #[error("[BKO-006] Duplicate record id '{0}'")]
    DuplicateId(String),

    /// A record carries neither `id` nor `key` (BKO-007).
    #[error("[BKO-007] Record at position {0} has no 'id' or 'key' field")]
    MissingId(usize),

    /// Page size outside the configured options (BKO-008).
    #[error("[BKO-008] Page size {size} is not one of {allowed:?}")]
    InvalidPageSize {
        /// Requested size.
        size: usize,
        /// Allowed sizes.
        allowed: Vec<usize>,
    },

    /// Column unknown to the grid, or not usable for the operation (BKO-009).
    #[error("[BKO-009] Column '{field}' cannot be used: {reason}")]
    UnknownColumn {
        /// Field named by the caller.
        field: String,
        /// Why the column was refused.
        reason: &'static str,
    },

    /// Configuration error (BKO-010).
    #[error("[BKO-010] Configuration error: {0}")]
    Config(String),

    /// IO error (BKO-011).
    #[error("[BKO-011] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (BKO-012).
    #[error("[BKO-012] Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns the error code (e.g., "BKO-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "BKO-001",
            Self::FetchFailed(_) => "BKO-002",
            Self::ValidationFailed(_) => "BKO-003",
            Self::Unauthorized(_) => "BKO-004",
            Self::CollectionNotFound(_) => "BKO-005",
            Self::DuplicateId(_) => "BKO-006",
            Self::MissingId(_) => "BKO-007",
            Self::InvalidPageSize { .. } => "BKO-008",
            Self::UnknownColumn { .. } => "BKO-009",
            Self::Config(_) => "BKO-010",
            Self::Io(_) => "BKO-011",
            Self::Serialization(_) => "BKO-012",
        }
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// Only transport failures qualify; pages offer a retry button for them.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed(_) | Self::Io(_))
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
