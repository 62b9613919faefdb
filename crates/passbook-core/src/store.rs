//! The credential store controller.
//!
//! Owns the ordered collection, the draft form, and per-record reveal state,
//! and mirrors the collection into a [`KeyValueStore`] after every mutation.
//! All operations run to completion synchronously; there is no intermediate
//! "saving" state.

use crate::error::{Result, StoreError};
use crate::models::{CredentialRecord, DeletionRequest, Draft, DraftField, Notification};
use crate::storage::KeyValueStore;
use std::collections::{HashMap, HashSet};

/// Key under which the whole collection is stored.
pub const NAMESPACE_KEY: &str = "passwords";

/// Controller over a persisted, ordered list of credentials.
pub struct CredentialStore<S: KeyValueStore> {
    storage: S,
    records: Vec<CredentialRecord>,
    draft: Draft,
    reveal_state: HashMap<String, bool>,
    draft_revealed: bool,
    pending_deletion: Option<DeletionRequest>,
    dirty: bool,
    recovered_from_malformed: bool,
}

impl<S: KeyValueStore> CredentialStore<S> {
    /// Load the collection from `storage`.
    ///
    /// An absent value starts an empty collection. A value that does not
    /// parse as a list of records is treated as absent; only a failing read
    /// of the adapter itself is an error.
    pub fn open(storage: S) -> Result<Self> {
        let raw = storage.read(NAMESPACE_KEY).map_err(StoreError::Read)?;

        let mut recovered_from_malformed = false;
        // An empty string counts as nothing stored.
        let records = match raw.filter(|raw| !raw.is_empty()) {
            None => {
                tracing::info!("No stored credentials under {:?}, starting empty", NAMESPACE_KEY);
                Vec::new()
            }
            Some(raw) => match serde_json::from_str::<Vec<CredentialRecord>>(&raw) {
                Ok(records) => dedupe_ids(records),
                Err(e) => {
                    tracing::warn!(
                        "Stored credentials under {:?} are malformed ({}), starting empty",
                        NAMESPACE_KEY,
                        e
                    );
                    recovered_from_malformed = true;
                    Vec::new()
                }
            },
        };

        tracing::info!("Loaded {} credentials", records.len());

        Ok(Self {
            storage,
            records,
            draft: Draft::new(),
            reveal_state: HashMap::new(),
            draft_revealed: false,
            pending_deletion: None,
            dirty: false,
            recovered_from_malformed,
        })
    }

    /// Records in display order.
    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by id.
    pub fn find(&self, id: &str) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Whether the password of `id` should render as plaintext.
    pub fn is_revealed(&self, id: &str) -> bool {
        self.reveal_state.get(id).copied().unwrap_or(false)
    }

    pub fn is_draft_revealed(&self) -> bool {
        self.draft_revealed
    }

    pub fn pending_deletion(&self) -> Option<&DeletionRequest> {
        self.pending_deletion.as_ref()
    }

    /// Whether the last write failed, leaving memory ahead of storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether `open` discarded a malformed stored value.
    pub fn recovered_from_malformed(&self) -> bool {
        self.recovered_from_malformed
    }

    /// Access the underlying adapter.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Set one field of the draft.
    pub fn update_draft(&mut self, field: DraftField, value: impl Into<String>) {
        *self.draft.get_mut(field) = value.into();
    }

    /// Whether `submit_create` would accept the current draft.
    pub fn can_submit(&self) -> bool {
        self.draft.first_blank().is_none()
    }

    /// Append the draft as a new record with a fresh id and clear the draft.
    pub fn submit_create(&mut self) -> Result<Notification> {
        if let Some(field) = self.draft.first_blank() {
            return Err(StoreError::BlankField(field));
        }

        let record = CredentialRecord::from_draft(&self.draft);
        let notification = Notification::Created {
            id: record.id.clone(),
            site: record.site.clone(),
        };
        tracing::info!("Creating credential {} for {}", record.id, record.site);

        self.records.push(record);
        self.draft.clear();
        self.persist()?;
        Ok(notification)
    }

    /// Move a record into the draft for editing.
    ///
    /// The record is removed from the collection and from storage right away.
    /// Submitting the draft creates a new record with a new id; abandoning the
    /// edit loses the record.
    pub fn begin_edit(&mut self, id: &str) -> Result<()> {
        let index = self.position(id)?;
        let record = self.records.remove(index);
        tracing::info!("Editing credential {} for {}", record.id, record.site);

        self.draft = Draft::from_record(&record);
        self.forget(&record.id);
        self.persist()
    }

    /// First step of deletion: ask for confirmation.
    ///
    /// Nothing is removed until [`confirm_delete`](Self::confirm_delete) is
    /// called. A new request replaces any earlier one.
    pub fn request_delete(&mut self, id: &str) -> Result<&DeletionRequest> {
        let index = self.position(id)?;
        let record = &self.records[index];
        let request = DeletionRequest {
            id: record.id.clone(),
            site: record.site.clone(),
        };
        tracing::debug!("Deletion of {} awaiting confirmation", request.id);
        let request = self.pending_deletion.insert(request);
        Ok(&*request)
    }

    /// Second step of deletion: remove the record awaiting confirmation.
    pub fn confirm_delete(&mut self) -> Result<Notification> {
        let request = self
            .pending_deletion
            .take()
            .ok_or(StoreError::NoPendingDeletion)?;
        let index = self.position(&request.id)?;
        let record = self.records.remove(index);
        tracing::info!("Deleted credential {} for {}", record.id, record.site);

        self.forget(&record.id);
        self.persist()?;
        Ok(Notification::Deleted {
            id: record.id,
            site: record.site,
        })
    }

    /// Drop the pending deletion. Returns whether one was pending.
    pub fn cancel_delete(&mut self) -> bool {
        self.pending_deletion.take().is_some()
    }

    /// Flip plaintext/masked rendering for one record. Returns the new state.
    pub fn toggle_reveal(&mut self, id: &str) -> bool {
        let revealed = self.reveal_state.entry(id.to_string()).or_insert(false);
        *revealed = !*revealed;
        *revealed
    }

    /// Flip plaintext/masked rendering of the draft password.
    pub fn toggle_draft_reveal(&mut self) -> bool {
        self.draft_revealed = !self.draft_revealed;
        self.draft_revealed
    }

    /// Write the current collection again, e.g. after a failed write.
    pub fn flush(&mut self) -> Result<()> {
        self.persist()
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::UnknownRecord(id.to_string()))
    }

    /// Drop presentation state tied to a record leaving the collection.
    fn forget(&mut self, id: &str) {
        self.reveal_state.remove(id);
        if self.pending_deletion.as_ref().is_some_and(|p| p.id == id) {
            self.pending_deletion = None;
        }
    }

    fn persist(&mut self) -> Result<()> {
        let value = serde_json::to_string(&self.records)?;
        match self.storage.write(NAMESPACE_KEY, &value) {
            Ok(()) => {
                self.dirty = false;
                tracing::debug!("Persisted {} credentials", self.records.len());
                Ok(())
            }
            Err(source) => {
                // No rollback: memory stays ahead of storage until the next
                // successful write.
                self.dirty = true;
                tracing::error!("Failed to persist credentials: {}", source);
                Err(StoreError::Write {
                    key: NAMESPACE_KEY.to_string(),
                    source,
                })
            }
        }
    }
}

/// Keep the first record for each id.
fn dedupe_ids(records: Vec<CredentialRecord>) -> Vec<CredentialRecord> {
    let mut seen = HashSet::new();
    let total = records.len();
    let unique: Vec<_> = records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    if unique.len() != total {
        tracing::warn!("Dropped {} credentials with duplicate ids", total - unique.len());
    }
    unique
}
