//! UI rendering with Ratatui.

use crate::app::{App, AppState, Focus, InputMode, ToastKind};
use passbook_core::DraftField;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    if app.state == AppState::Quit {
        return;
    }

    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(7), // Form
            Constraint::Min(5),    // Table
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_title(frame, chunks[0]);
    render_form(frame, app, chunks[1]);
    render_table(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);

    if app.input_mode == InputMode::ConfirmDelete {
        render_confirm_dialog(frame, app, area);
    }
    render_toasts(frame, app, area);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(" 🔒 Password Manager")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(title, area);
}

/// Render the draft form.
fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let draft = app.store.draft();
    let is_focused = matches!(app.focus, Focus::Field(_)) && app.input_mode == InputMode::Normal;
    let border_color = if is_focused { Color::Cyan } else { Color::DarkGray };
    let title = if draft.edit_origin.is_some() {
        " ✏️  Edit Password "
    } else {
        " ➕ New Password "
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    for (i, field) in DraftField::ALL.into_iter().enumerate() {
        let value = draft.get(field);
        let shown = if field == DraftField::Password && !app.store.is_draft_revealed() {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let focused = is_focused && app.focus == Focus::Field(field);
        render_input(frame, field.label(), &shown, focused, chunks[i]);
    }

    let reveal_hint = if app.store.is_draft_revealed() {
        "Ctrl+R: hide"
    } else {
        "Ctrl+R: show"
    };
    let button_style = if app.store.can_submit() {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let actions = Line::from(vec![
        Span::styled(" Save Password ", button_style),
        Span::styled(
            format!("  Enter: save | Tab: next | {reveal_hint}"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(actions), chunks[4]);
}

fn render_input(frame: &mut Frame, label: &str, value: &str, focused: bool, area: Rect) {
    let value_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let mut spans = vec![
        Span::styled(format!("{:>9}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), value_style),
    ];
    if focused {
        spans.push(Span::styled(
            "_",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the saved passwords table.
fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Table && app.input_mode != InputMode::ConfirmDelete;
    let border_color = if is_focused { Color::Cyan } else { Color::DarkGray };

    let title = if app.input_mode == InputMode::Filter || !app.filter_query.is_empty() {
        format!(" 🔑 Your Passwords  🔍 {} ", app.filter_query)
    } else {
        " 🔑 Your Passwords ".to_string()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let records = app.visible_records();
    if records.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let message = if app.store.is_empty() {
            "No passwords to show"
        } else {
            "No matching passwords"
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, centered_rect(inner.width, 1, inner));
        return;
    }

    let header = Row::new(["Site Name", "Username", "Password"])
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            let password = if app.store.is_revealed(&record.id) {
                Cell::from(record.password.as_str()).style(Style::default().fg(Color::Yellow))
            } else {
                Cell::from(app.mask.as_str()).style(Style::default().fg(Color::DarkGray))
            };
            Row::new(vec![
                Cell::from(record.site.as_str()),
                Cell::from(record.username.as_str()).style(Style::default().fg(Color::Green)),
                password,
            ])
        })
        .collect();

    let highlight = if is_focused {
        Style::default()
            .bg(Color::Rgb(60, 60, 80))
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(highlight);

    let mut state = TableState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Render the bottom status bar.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let save_status = if app.store.is_dirty() {
        Span::styled("● unsaved changes (Ctrl+S to retry)", Style::default().fg(Color::Red))
    } else {
        match &app.last_save {
            Some(time) => Span::styled(
                format!("Last save: {time}"),
                Style::default().fg(Color::DarkGray),
            ),
            None => Span::styled("No changes", Style::default().fg(Color::DarkGray)),
        }
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} entries | {} | ", app.store.len(), app.storage_label),
            Style::default().fg(Color::DarkGray),
        ),
        save_status,
        Span::styled(
            " | v: show  e: edit  d: delete  /: filter  q: quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the delete confirmation dialog.
fn render_confirm_dialog(frame: &mut Frame, app: &App, area: Rect) {
    let Some(request) = app.store.pending_deletion() else {
        return;
    };

    let dialog_width = 56.min(area.width.saturating_sub(4));
    let dialog_height = 6.min(area.height.saturating_sub(2));
    let dialog_area = centered_rect(dialog_width, dialog_height, area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" 🗑️  Delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(request.prompt()),
        Line::from(Span::styled(
            request.site.as_str(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y: delete | n: keep",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

/// Render toasts stacked in the top-right corner.
fn render_toasts(frame: &mut Frame, app: &App, area: Rect) {
    let width = 36.min(area.width);
    for (i, toast) in app.toasts.iter().enumerate() {
        let y = area.y + 1 + (i as u16) * 3;
        if y + 3 > area.y + area.height {
            break;
        }
        let toast_area = Rect::new(area.x + area.width - width, y, width, 3);

        let (icon, color) = match toast.kind {
            ToastKind::Success => ("🔒", Color::Green),
            ToastKind::Removed => ("🗑️", Color::Red),
            ToastKind::Error => ("⚠️", Color::Yellow),
        };

        frame.render_widget(Clear, toast_area);
        let paragraph = Paragraph::new(format!("{icon} {}", toast.message))
            .style(Style::default().fg(color))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        frame.render_widget(paragraph, toast_area);
    }
}

/// Helper to create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{add, test_app};
    use ratatui::backend::TestBackend;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_store_shows_placeholder() {
        let app = test_app();
        assert!(draw(&app).contains("No passwords to show"));
    }

    #[test]
    fn passwords_are_masked_until_revealed() {
        let mut app = test_app();
        add(&mut app, "example.com", "alice", "hunter2");
        let id = app.store.records()[0].id.clone();

        let screen = draw(&app);
        assert!(screen.contains("example.com"));
        assert!(!screen.contains("hunter2"));

        app.store.toggle_reveal(&id);
        assert!(draw(&app).contains("hunter2"));
    }
}
