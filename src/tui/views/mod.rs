// Views module - screen-level rendering logic
//
// - Auth: login and signup forms
// - Tasks: the board, one group per status
// - Summary: today's totals, status chart and task lists
//
// The shell (title, optional log strip, status bar) is the same everywhere;
// modals and the toast draw last so they sit on top.

mod auth;
mod modal;
mod summary;
mod tasks;

use super::app::{App, Screen};
use crate::theme::Theme;
use crate::tui::components::{logs_panel, status_bar, title_bar};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

const LOG_STRIP_HEIGHT: u16 = 8;

/// Main render function, called on every frame
pub fn draw(f: &mut Frame, app: &App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    let mut constraints = vec![Constraint::Length(3), Constraint::Min(6)];
    if app.ui.show_logs {
        constraints.push(Constraint::Length(LOG_STRIP_HEIGHT));
    }
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    title_bar::render(f, chunks[0], app);

    let content = chunks[1];
    match app.screen {
        Screen::Login => auth::render_login(f, content, app),
        Screen::Signup => auth::render_signup(f, content, app),
        Screen::Tasks => tasks::render(f, content, app),
        Screen::Summary => summary::render(f, content, app),
    }

    if app.ui.show_logs {
        logs_panel::render(f, chunks[2], app);
    }
    status_bar::render(f, chunks[chunks.len() - 1], app);

    if let Some(modal) = &app.modal {
        modal::render(f, modal, app);
    }

    if let Some(toast) = &app.toast {
        toast.render(f, f.area(), &app.theme);
    }
}

/// One labelled single-line input box; secrets render as bullets
pub(super) fn text_field(
    f: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    secret: bool,
    focused: bool,
    theme: &Theme,
) {
    let shown = if secret {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };

    // Leave a cell for the cursor
    let room = usize::from(area.width.saturating_sub(3));
    let visible = tail_to_width(&shown, room);

    let border = if focused { theme.highlight } else { theme.border };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", label));

    f.render_widget(
        Paragraph::new(visible.to_string())
            .style(Style::default().fg(theme.foreground))
            .block(block),
        area,
    );

    if focused {
        let offset = unicode_width::UnicodeWidthStr::width(visible) as u16;
        f.set_cursor_position((area.x + 1 + offset, area.y + 1));
    }
}

/// A single message line centered in `area`
pub(super) fn centered_line(f: &mut Frame, area: Rect, line: Line) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(area);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), rows[1]);
}

/// The longest suffix of `s` that fits in `width` columns
fn tail_to_width(s: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices().rev() {
        used += c.width().unwrap_or(0);
        if used > width {
            return &s[idx + c.len_utf8()..];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_input_keeps_its_tail() {
        assert_eq!(tail_to_width("hello", 10), "hello");
        assert_eq!(tail_to_width("hello", 3), "llo");
        assert_eq!(tail_to_width("••••", 2), "••");
        assert_eq!(tail_to_width("abc", 0), "");
    }
}
