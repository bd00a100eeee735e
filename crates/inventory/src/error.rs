use std::path::PathBuf;

use stockroom_core::DomainError;
use thiserror::Error;

/// Failures surfaced by [`crate::Inventory`] operations.
///
/// Expected outcomes (duplicate code, unknown code, empty filter result) are
/// not errors; they are returned as outcome values.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The inventory file is not a valid JSON array of product records.
    #[error("malformed inventory file {path}: {source}")]
    MalformedData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record parsed but breaks a domain rule (negative price, empty or duplicated code).
    #[error("malformed inventory file {path}: record {index}: {source}")]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input text could not be coerced; nothing was changed.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// `save` was called before `load`; refusing to overwrite an unread file.
    #[error("inventory has not been loaded")]
    NotLoaded,
}

impl InventoryError {
    /// Whether this error comes from the file contents rather than the filesystem.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            InventoryError::MalformedData { .. } | InventoryError::InvalidRecord { .. }
        )
    }
}
