use serde::Serialize;

use crate::types::DbId;

/// Domain error taxonomy shared by the reconciler, the ledger and every
/// backend implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CoreError {
    /// The referenced record no longer exists. The caller's view is stale
    /// and must be refreshed rather than retried verbatim.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A duplicate active record (signature or selection) already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed input, rejected before any backend call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Transport failure; the server expressed no opinion.
    #[error("Network error: {0}")]
    Network(String),

    /// Generic backend failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }

    /// Whether re-issuing the same call may succeed without the caller
    /// refreshing its state first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the error signals a stale client view.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<String> for CoreError {
    /// Validation helpers return `Result<(), String>`; lift them here.
    fn from(msg: String) -> Self {
        Self::Validation(msg)
    }
}
