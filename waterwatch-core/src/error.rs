//! Error types shared by the lookup collaborators.

use thiserror::Error;

/// Errors raised by the catalog, metric store and threshold registry.
///
/// A miss is never an error: lookups return empty lists or `None`. These
/// variants mean the backing store itself could not be consulted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{store} unavailable: {reason}")]
    Unavailable { store: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Shorthand for an unavailable backend.
    pub fn unavailable(store: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            store,
            reason: reason.into(),
        }
    }
}
