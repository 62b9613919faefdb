//! Core models and credential store handling for passbook.
//!
//! This crate provides the headless credential store controller, its data
//! model, and the persistence adapters it writes through. Frontends drive it
//! by calling its operations and re-rendering from its state.

pub mod error;
pub mod models;
pub mod storage;
pub mod store;

pub use error::{Result, StorageError, StoreError};
pub use models::{CredentialRecord, DeletionRequest, Draft, DraftField, Notification};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{CredentialStore, NAMESPACE_KEY};
