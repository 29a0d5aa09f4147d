// Title bar component
//
// App name, the two board tabs, and who is signed in.

use crate::tui::app::{App, Screen};
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let title_style = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);

    let mut spans = vec![Span::styled(" ⏱ TaskTime", title_style)];

    if app.screen.is_gated() {
        spans.push(Span::styled("  │ ", Style::default().fg(theme.border)));
        for (screen, label) in [(Screen::Tasks, "1 Tasks"), (Screen::Summary, "2 Today's Summary")] {
            let style = if app.screen == screen {
                Style::default()
                    .fg(theme.selection_fg)
                    .bg(theme.selection)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            spans.push(Span::styled(format!(" {} ", label), style));
            spans.push(Span::raw(" "));
        }
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.title));

    // Name drops off first on narrow terminals
    if let Some(user) = &app.user {
        if Breakpoint::from_width(area.width).side_by_side() {
            block = block.title_top(
                Line::from(format!(" {} · L logout ", user.display_name())).right_aligned(),
            );
        }
    }

    let title = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(theme.foreground))
        .block(block);

    f.render_widget(title, area);
}
