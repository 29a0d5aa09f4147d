// Status bar component
//
// Board counters on the left, key hints for the current screen after them.

use crate::tui::app::{App, Screen};
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Key hints per screen, full and compact
fn hints(screen: Screen, compact: bool) -> &'static str {
    match (screen, compact) {
        (Screen::Tasks, false) => {
            "j/k select │ s start │ x stop │ f finish │ d delete │ n new │ r refresh │ ? help │ q quit"
        }
        (Screen::Tasks, true) => "s/x/f/d act │ n new │ ? help",
        (Screen::Summary, false) => "r refresh │ 1 tasks │ t theme │ ? help │ q quit",
        (Screen::Summary, true) => "r refresh │ ? help",
        (Screen::Login, false) => "Tab next field │ Enter log in │ Ctrl+N create account │ Esc quit",
        (Screen::Login, true) => "Enter log in │ Ctrl+N sign up",
        (Screen::Signup, false) => "Tab next field │ Enter sign up │ Esc back to login",
        (Screen::Signup, true) => "Enter sign up │ Esc back",
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let compact = !Breakpoint::from_width(area.width).side_by_side();
    let theme = &app.theme;
    let mut spans = Vec::new();

    if app.screen.is_gated() {
        let timing = app.tasks.timing().len();
        spans.push(Span::raw(format!(" {} tasks", app.tasks.tasks().len())));
        if timing > 0 {
            spans.push(Span::raw(" │ "));
            spans.push(Span::styled(
                format!("⏱ {} timing", timing),
                Style::default().fg(theme.timing),
            ));
        }
        if app.tasks.is_loading() {
            let frame = (app.frame / 2) % SPINNER.len();
            spans.push(Span::raw(format!(" │ {} loading", SPINNER[frame])));
        }
        spans.push(Span::raw(" │ "));
    } else {
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled(
        hints(app.screen, compact),
        Style::default().fg(theme.muted),
    ));

    let status = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(theme.status_bar))
        .block(Block::default().borders(Borders::TOP));

    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_hints_are_shorter() {
        for screen in [Screen::Tasks, Screen::Summary, Screen::Login, Screen::Signup] {
            assert!(hints(screen, true).len() < hints(screen, false).len());
        }
    }
}
