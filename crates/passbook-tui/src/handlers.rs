//! Keyboard event handling.

use crate::app::{App, AppState, Focus, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle a key event. Returns true if the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    // Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.state = AppState::Quit;
        return true;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::ConfirmDelete => handle_confirm_key(app, key),
        InputMode::Filter => handle_filter_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('r') => app.toggle_draft_reveal(),
            KeyCode::Char('s') => app.flush(),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Tab => {
            app.focus_next();
            return false;
        }
        KeyCode::BackTab => {
            app.focus_prev();
            return false;
        }
        _ => {}
    }

    match app.focus {
        Focus::Field(_) => handle_form_key(app, key),
        Focus::Table => handle_table_key(app, key),
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Char(c) => app.input_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Esc => app.focus = Focus::Table,
        _ => {}
    }
    false
}

fn handle_table_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quit;
            return true;
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char(' ') | KeyCode::Char('v') => app.toggle_reveal_selected(),
        KeyCode::Char('e') => app.edit_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete_selected(),
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Esc => {
            if !app.filter_query.is_empty() {
                app.clear_filter();
            }
        }
        _ => {}
    }
    false
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
    false
}

fn handle_filter_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Enter => app.finish_filter(),
        KeyCode::Char(c) => app.push_filter_char(c),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Up => app.move_up(),
        KeyCode::Down => app.move_down(),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{add, test_app};
    use crate::app::ToastKind;
    use passbook_core::DraftField;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_fills_the_form_and_enter_saves() {
        let mut app = test_app();
        type_str(&mut app, "example.com");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "alice");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "p1x");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.store.len(), 1);
        let record = &app.store.records()[0];
        assert_eq!(record.site, "example.com");
        assert_eq!(record.username, "alice");
        assert_eq!(record.password, "p1");
        assert_eq!(app.focus, Focus::Field(DraftField::Site));
        assert!(app.store.draft().site.is_empty());
    }

    #[test]
    fn q_in_the_form_is_text_not_quit() {
        let mut app = test_app();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.store.draft().site, "q");
        assert_eq!(app.state, AppState::Running);
    }

    #[test]
    fn q_in_the_table_quits() {
        let mut app = test_app();
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::Table);
        assert!(press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Quit);
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut app = test_app();
        app.start_filter();
        assert!(ctrl(&mut app, 'c'));
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let mut app = test_app();
        add(&mut app, "first.com", "a", "1");
        add(&mut app, "second.com", "b", "2");
        app.focus = Focus::Table;

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.input_mode, InputMode::ConfirmDelete);
        assert_eq!(app.store.len(), 2);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.store.len(), 2);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.records()[0].site, "second.com");
        let last = app.toasts.last().unwrap();
        assert_eq!(last.message, "Password Deleted!");
        assert_eq!(last.kind, ToastKind::Removed);
    }

    #[test]
    fn edit_moves_record_into_form() {
        let mut app = test_app();
        add(&mut app, "example.com", "alice", "p1");
        app.focus = Focus::Table;

        press(&mut app, KeyCode::Char('e'));
        assert!(app.store.is_empty());
        assert_eq!(app.focus, Focus::Field(DraftField::Site));
        assert_eq!(app.store.draft().username, "alice");
    }

    #[test]
    fn reveal_toggles_selected_row() {
        let mut app = test_app();
        add(&mut app, "example.com", "alice", "p1");
        app.focus = Focus::Table;
        let id = app.store.records()[0].id.clone();

        press(&mut app, KeyCode::Char('v'));
        assert!(app.store.is_revealed(&id));
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.store.is_revealed(&id));
    }

    #[test]
    fn ctrl_r_toggles_draft_reveal() {
        let mut app = test_app();
        ctrl(&mut app, 'r');
        assert!(app.store.is_draft_revealed());
        assert!(app.store.draft().site.is_empty());
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut app = test_app();
        add(&mut app, "a.com", "a", "1");
        add(&mut app, "b.com", "b", "2");
        app.focus = Focus::Table;

        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_index, 0);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_index, 1);
    }

    #[test]
    fn filter_mode_captures_text() {
        let mut app = test_app();
        add(&mut app, "github.com", "alice", "p");
        add(&mut app, "example.com", "bob", "p");
        app.focus = Focus::Table;

        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "bob");
        assert_eq!(app.filter_query, "bob");
        assert_eq!(app.visible_records().len(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.selected_record().unwrap().site, "example.com");

        press(&mut app, KeyCode::Esc);
        assert!(app.filter_query.is_empty());
    }
}
