// Modal overlay rendering
//
// - Help: keyboard shortcuts and the active theme
// - Create task: four-field form with inline validation errors
// - Confirm delete: names the task and waits for y/n

use super::text_field;
use crate::board::CreateTaskForm;
use crate::tui::app::App;
use crate::tui::layout::centered_rect;
use crate::tui::modal::Modal;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, modal: &Modal, app: &App) {
    match modal {
        Modal::Help => render_help(f, app),
        Modal::CreateTask => render_create(f, app),
        Modal::ConfirmDelete { name, .. } => render_confirm_delete(f, app, name),
    }
}

fn modal_block<'a>(app: &App, title: &'a str, hint: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight))
        .border_type(app.theme.border_type)
        .style(Style::default().bg(app.theme.background))
        .title(title)
        .title_bottom(Line::from(hint).centered())
}

fn render_help(f: &mut Frame, app: &App) {
    let key_style = Style::default().fg(app.theme.timing);
    let desc_style = Style::default().fg(app.theme.foreground);
    let header_style = Style::default()
        .fg(app.theme.highlight)
        .add_modifier(Modifier::BOLD);

    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<12}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled("  Screens", header_style)),
        kb("1", "Task board"),
        kb("2", "Today's summary"),
        kb("Tab", "Switch screen"),
        Line::raw(""),
        Line::from(Span::styled("  Board", header_style)),
        kb("↑/↓, j/k", "Select card"),
        kb("s", "Start timer"),
        kb("x", "Stop timer"),
        kb("f", "Finish task"),
        kb("d", "Delete task"),
        kb("n", "New task"),
        kb("r", "Refresh"),
        Line::raw(""),
        Line::from(Span::styled("  General", header_style)),
        kb("t", "Cycle theme"),
        kb("L", "Log out"),
        kb("?", "Toggle this help"),
        kb("q, Ctrl+C", "Quit"),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Theme: ", desc_style),
            Span::styled(app.theme.kind.name(), key_style),
        ]),
    ]);

    let area = centered_rect(40, 27, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(content).block(modal_block(app, " Help ", " ? or Esc to close ")),
        area,
    );
}

fn render_create(f: &mut Frame, app: &App) {
    let form = &app.create_form;
    let theme = &app.theme;

    let height = CreateTaskForm::LABELS.len() as u16 * 3 + 4;
    let area = centered_rect(52, height, f.area());
    f.render_widget(Clear, area);

    let block = modal_block(app, " New task ", " Enter create · Tab next · Esc cancel ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(3); CreateTaskForm::LABELS.len()];
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let creating = app.tasks.is_creating();
    for (i, (label, value)) in CreateTaskForm::LABELS
        .iter()
        .zip(form.values())
        .enumerate()
    {
        let focused = i == form.focus && !creating;
        text_field(f, rows[i], label, value, false, focused, theme);
    }

    let message = if creating {
        Line::styled("Creating…", Style::default().fg(theme.muted))
    } else if let Some(error) = &form.error {
        Line::styled(error.clone(), Style::default().fg(theme.error))
    } else {
        Line::default()
    };
    f.render_widget(
        Paragraph::new(message).wrap(Wrap { trim: true }),
        rows[CreateTaskForm::LABELS.len()],
    );
}

fn render_confirm_delete(f: &mut Frame, app: &App, name: &str) {
    let theme = &app.theme;
    let content = Text::from(vec![
        Line::raw(""),
        Line::from(vec![
            Span::styled("Delete ", Style::default().fg(theme.foreground)),
            Span::styled(
                format!("\"{}\"", name),
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            ),
            Span::styled("?", Style::default().fg(theme.foreground)),
        ]),
        Line::styled("This cannot be undone.", Style::default().fg(theme.muted)),
    ]);

    let area = centered_rect(48, 7, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(modal_block(app, " Delete task ", " y delete · n cancel ")),
        area,
    );
}
