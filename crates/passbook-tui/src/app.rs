//! Application state management.

use crate::config::Config;
use passbook_core::{
    CredentialRecord, CredentialStore, DraftField, KeyValueStore, Notification, StoreError,
};
use std::time::{Duration, Instant};

/// Controller type driven by the TUI.
pub type Store = CredentialStore<Box<dyn KeyValueStore>>;

/// Toasts kept on screen at once.
const MAX_TOASTS: usize = 3;

/// Application state.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    /// Handling input.
    Running,
    /// Application should quit.
    Quit,
}

/// Input mode for the application.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    /// Form editing and table navigation.
    Normal,
    /// A deletion is waiting for yes/no.
    ConfirmDelete,
    /// Typing a table filter.
    Filter,
}

/// Focus area within the main view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    /// One of the form inputs.
    Field(DraftField),
    /// The saved passwords table.
    Table,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Field(DraftField::Site) => Focus::Field(DraftField::Username),
            Focus::Field(DraftField::Username) => Focus::Field(DraftField::Password),
            Focus::Field(DraftField::Password) => Focus::Table,
            Focus::Table => Focus::Field(DraftField::Site),
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Field(DraftField::Site) => Focus::Table,
            Focus::Field(DraftField::Username) => Focus::Field(DraftField::Site),
            Focus::Field(DraftField::Password) => Focus::Field(DraftField::Username),
            Focus::Table => Focus::Field(DraftField::Password),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToastKind {
    Success,
    Removed,
    Error,
}

/// A transient message in the corner of the screen.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

/// Main application model.
pub struct App {
    /// Current application state.
    pub state: AppState,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Current focus area.
    pub focus: Focus,
    /// The credential store controller.
    pub store: Store,
    /// Where the credentials live, for the status bar.
    pub storage_label: String,
    /// Index of the selected row among the visible records.
    pub selected_index: usize,
    /// Table filter query.
    pub filter_query: String,
    /// Active toasts, oldest first.
    pub toasts: Vec<Toast>,
    /// Wall-clock time of the last successful save.
    pub last_save: Option<String>,
    /// Text shown in place of hidden passwords.
    pub mask: String,
    toast_duration: Duration,
}

impl App {
    /// Create a new application instance.
    pub fn new(mut store: Store, storage_label: String, config: &Config) -> Self {
        if config.reveal_draft_by_default {
            store.toggle_draft_reveal();
        }
        let recovered = store.recovered_from_malformed();

        let mut app = Self {
            state: AppState::Running,
            input_mode: InputMode::Normal,
            focus: Focus::Field(DraftField::Site),
            store,
            storage_label,
            selected_index: 0,
            filter_query: String::new(),
            toasts: Vec::new(),
            last_save: None,
            mask: config.mask.clone(),
            toast_duration: Duration::from_millis(config.toast_duration_ms),
        };
        if recovered {
            app.push_toast(
                "Stored passwords were unreadable, starting empty".to_string(),
                ToastKind::Error,
            );
        }
        app
    }

    /// Records shown in the table, in collection order, narrowed by the filter.
    pub fn visible_records(&self) -> Vec<&CredentialRecord> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let query = self.filter_query.trim();
        if query.is_empty() {
            return self.store.records().iter().collect();
        }

        let matcher = SkimMatcherV2::default();
        self.store
            .records()
            .iter()
            .filter(|record| {
                let text = format!("{} {}", record.site, record.username);
                matcher.fuzzy_match(&text, query).is_some()
            })
            .collect()
    }

    /// The highlighted record, if any.
    pub fn selected_record(&self) -> Option<&CredentialRecord> {
        self.visible_records().get(self.selected_index).copied()
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_record().map(|r| r.id.clone())
    }

    /// Move selection up in the table.
    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Move selection down in the table.
    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.visible_records().len() {
            self.selected_index += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_records().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Append a character to the focused form field.
    pub fn input_char(&mut self, c: char) {
        if let Focus::Field(field) = self.focus {
            let mut value = self.store.draft().get(field).to_string();
            value.push(c);
            self.store.update_draft(field, value);
        }
    }

    /// Remove the last character of the focused form field.
    pub fn backspace(&mut self) {
        if let Focus::Field(field) = self.focus {
            let mut value = self.store.draft().get(field).to_string();
            value.pop();
            self.store.update_draft(field, value);
        }
    }

    /// Save the form as a new record. Ignored while a field is empty.
    pub fn submit(&mut self) {
        if !self.store.can_submit() {
            return;
        }
        let result = self.store.submit_create();
        if self.report(result) {
            self.focus = Focus::Field(DraftField::Site);
        }
    }

    /// Move the selected record into the form.
    pub fn edit_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let result = self.store.begin_edit(&id);
        self.clamp_selection();
        if self.report(result) {
            self.focus = Focus::Field(DraftField::Site);
        }
    }

    /// Ask for confirmation before deleting the selected record.
    pub fn request_delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let result = self.store.request_delete(&id).map(|_| ());
        match result {
            Ok(()) => self.input_mode = InputMode::ConfirmDelete,
            Err(e) => self.push_error(&e),
        }
    }

    /// Commit the pending deletion.
    pub fn confirm_delete(&mut self) {
        self.input_mode = InputMode::Normal;
        let result = self.store.confirm_delete();
        self.report(result);
        self.clamp_selection();
    }

    /// Drop the pending deletion.
    pub fn cancel_delete(&mut self) {
        self.input_mode = InputMode::Normal;
        self.store.cancel_delete();
    }

    /// Toggle plaintext display of the selected record's password.
    pub fn toggle_reveal_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.store.toggle_reveal(&id);
        }
    }

    pub fn toggle_draft_reveal(&mut self) {
        self.store.toggle_draft_reveal();
    }

    /// Retry writing after a failed save.
    pub fn flush(&mut self) {
        if !self.store.is_dirty() {
            return;
        }
        let result = self.store.flush();
        if self.report(result) {
            self.push_toast("Changes saved".to_string(), ToastKind::Success);
        }
    }

    /// Start filter mode.
    pub fn start_filter(&mut self) {
        self.input_mode = InputMode::Filter;
        self.focus = Focus::Table;
        self.selected_index = 0;
    }

    /// Leave filter mode, keeping the query.
    pub fn finish_filter(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Leave filter mode and show every record again.
    pub fn clear_filter(&mut self) {
        self.input_mode = InputMode::Normal;
        self.filter_query.clear();
        self.clamp_selection();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.selected_index = 0;
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.selected_index = 0;
    }

    /// Drop toasts whose time is up.
    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    fn push_toast(&mut self, message: String, kind: ToastKind) {
        if self.toasts.len() == MAX_TOASTS {
            self.toasts.remove(0);
        }
        self.toasts.push(Toast {
            message,
            kind,
            expires_at: Instant::now() + self.toast_duration,
        });
    }

    fn push_error(&mut self, error: &StoreError) {
        if error.is_precondition() {
            tracing::debug!("Rejected: {}", error);
        } else {
            tracing::warn!("{}", error);
        }
        self.push_toast(error.to_string(), ToastKind::Error);
    }

    /// Turn an operation result into toasts and save-time bookkeeping.
    fn report<T: IntoToast>(&mut self, result: Result<T, StoreError>) -> bool {
        match result {
            Ok(value) => {
                self.last_save = Some(chrono::Local::now().format("%X").to_string());
                if let Some((message, kind)) = value.into_toast() {
                    self.push_toast(message, kind);
                }
                true
            }
            Err(e) => {
                self.push_error(&e);
                false
            }
        }
    }
}

/// Values that may produce a toast when an operation succeeds.
trait IntoToast {
    fn into_toast(self) -> Option<(String, ToastKind)>;
}

impl IntoToast for () {
    fn into_toast(self) -> Option<(String, ToastKind)> {
        None
    }
}

impl IntoToast for Notification {
    fn into_toast(self) -> Option<(String, ToastKind)> {
        let kind = match self {
            Notification::Created { .. } => ToastKind::Success,
            Notification::Deleted { .. } => ToastKind::Removed,
        };
        Some((self.message().to_string(), kind))
    }
}
