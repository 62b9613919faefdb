//! Error types for the credential store.

use crate::models::DraftField;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a persistence adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Failed to replace stored file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Failures raised by the credential store controller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} must not be empty")]
    BlankField(DraftField),

    #[error("Credential not found: {0}")]
    UnknownRecord(String),

    #[error("No deletion is awaiting confirmation")]
    NoPendingDeletion,

    #[error("Failed to read stored credentials: {0}")]
    Read(#[source] StorageError),

    #[error("Failed to save credentials under {key:?}: {source}")]
    Write {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to encode credentials: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the request was rejected before any state changed.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            StoreError::BlankField(_) | StoreError::UnknownRecord(_) | StoreError::NoPendingDeletion
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
