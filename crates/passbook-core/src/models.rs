//! Shared data types for the credential store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored site/username/password triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Opaque unique token, stable for the record's lifetime.
    pub id: String,
    pub site: String,
    pub username: String,
    pub password: String,
}

impl CredentialRecord {
    /// Build a record from a draft with a freshly generated id.
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            site: draft.site.clone(),
            username: draft.username.clone(),
            password: draft.password.clone(),
        }
    }
}

/// A field of the draft form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Site,
    Username,
    Password,
}

impl DraftField {
    /// All fields in form order.
    pub const ALL: [DraftField; 3] = [DraftField::Site, DraftField::Username, DraftField::Password];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            DraftField::Site => "Site",
            DraftField::Username => "Username",
            DraftField::Password => "Password",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transient form state for a record being created or edited. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub site: String,
    pub username: String,
    pub password: String,
    /// Id of the record an edit was started from. Informational only: a
    /// re-submitted edit always receives a new id.
    pub edit_origin: Option<String>,
}

impl Draft {
    /// Create an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a draft from an existing record.
    pub fn from_record(record: &CredentialRecord) -> Self {
        Self {
            site: record.site.clone(),
            username: record.username.clone(),
            password: record.password.clone(),
            edit_origin: Some(record.id.clone()),
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Site => &self.site,
            DraftField::Username => &self.username,
            DraftField::Password => &self.password,
        }
    }

    pub fn get_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Site => &mut self.site,
            DraftField::Username => &mut self.username,
            DraftField::Password => &mut self.password,
        }
    }

    /// First field that is empty, in form order.
    pub fn first_blank(&self) -> Option<DraftField> {
        DraftField::ALL
            .into_iter()
            .find(|field| self.get(*field).is_empty())
    }

    /// Reset every field to the empty string.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Informational notification emitted after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A record was appended to the collection.
    Created { id: String, site: String },
    /// A record was removed after confirmation.
    Deleted { id: String, site: String },
}

impl Notification {
    /// Short user-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            Notification::Created { .. } => "Password Saved!",
            Notification::Deleted { .. } => "Password Deleted!",
        }
    }
}

/// A deletion awaiting explicit user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub id: String,
    pub site: String,
}

impl DeletionRequest {
    /// Prompt shown to the user before committing the deletion.
    pub fn prompt(&self) -> &'static str {
        "Are you sure you want to delete this password?"
    }
}
