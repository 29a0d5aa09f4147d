// Task board view
//
// Three status groups (Pending, In Progress, Completed), side by side on
// wide terminals and stacked on narrow ones. Each card shows its name, a
// live timer while timing, and the actions it currently offers; actions
// that exist but are unavailable are dimmed, Finish is hidden once done.

use super::centered_line;
use crate::board::Affordances;
use crate::model::{Task, TaskStatus};
use crate::theme::Theme;
use crate::tui::app::App;
use crate::tui::layout::{board_regions, Breakpoint};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let tasks = &app.tasks;

    if !tasks.has_loaded() {
        let message = match tasks.last_error() {
            Some(error) if !tasks.is_loading() => Line::styled(
                format!("{}  (r to retry)", error),
                Style::default().fg(theme.error),
            ),
            _ => Line::styled("Loading tasks…", Style::default().fg(theme.muted)),
        };
        centered_line(f, area, message);
        return;
    }

    // A failed refresh keeps the last good list and reports above it
    let board = match tasks.last_error() {
        Some(error) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(3)])
                .split(area);
            f.render_widget(
                Paragraph::new(Line::styled(
                    format!(" ⚠ {}", error),
                    Style::default().fg(theme.error),
                )),
                rows[0],
            );
            rows[1]
        }
        None => area,
    };

    let groups = tasks.partition();
    let counts = TaskStatus::ALL.map(|s| groups.group(s).len());
    let regions = board_regions(board, counts);
    let details = Breakpoint::from_width(board.width).card_details();

    let mut offset = 0;
    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let cards = groups.group(*status);
        let selected = app
            .selected
            .checked_sub(offset)
            .filter(|local| *local < cards.len());
        render_group(f, regions[i], app, *status, cards, selected, details);
        offset += cards.len();
    }
}

fn render_group(
    f: &mut Frame,
    area: Rect,
    app: &App,
    status: TaskStatus,
    cards: &[&Task],
    selected: Option<usize>,
    details: bool,
) {
    let theme = &app.theme;
    let accent = theme.status(status);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(if selected.is_some() {
            accent
        } else {
            theme.border
        }))
        .title(Span::styled(
            format!(" {} ({}) ", status.label(), cards.len()),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));

    if cards.is_empty() {
        f.render_widget(
            Paragraph::new(Line::styled("No tasks", Style::default().fg(theme.muted)))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = cards
        .iter()
        .map(|task| card_item(app, task, details))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▌");

    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);
}

fn card_item<'a>(app: &'a App, task: &'a Task, details: bool) -> ListItem<'a> {
    let theme = &app.theme;
    let timer = app.timers.get(&task.id);
    let busy = app.tasks.is_busy(&task.id);

    let mut title = vec![Span::styled(
        task.user_task_name.as_str(),
        Style::default().fg(theme.foreground),
    )];
    if timer.is_timing() {
        title.push(Span::styled(
            format!("  ⏱ {}", timer.display()),
            Style::default().fg(theme.timing).add_modifier(Modifier::BOLD),
        ));
    }
    if busy {
        title.push(Span::styled("  …", Style::default().fg(theme.muted)));
    }

    let mut lines = vec![Line::from(title)];

    if details {
        if let Some(line) = planning_line(task, theme) {
            lines.push(line);
        }
    }

    lines.push(action_line(&app.affordances(task), theme));
    lines.push(Line::default());
    ListItem::new(lines)
}

fn planning_line<'a>(task: &Task, theme: &Theme) -> Option<Line<'a>> {
    let mut parts = Vec::new();
    if let Some(start) = task.planned_start() {
        parts.push(format!("from {}", start));
    }
    if let Some(end) = task.planned_end() {
        parts.push(format!("due {}", end));
    }
    if let Some(minutes) = task.estimated_effort_min {
        parts.push(format!("{} min", minutes));
    }
    if parts.is_empty() {
        return None;
    }
    Some(Line::styled(
        format!("  {}", parts.join(" · ")),
        Style::default().fg(theme.muted),
    ))
}

/// `[s]tart [x]stop [f]inish [d]elete` with unavailable actions dimmed
fn action_line<'a>(offered: &Affordances, theme: &Theme) -> Line<'a> {
    let enabled = Style::default().fg(theme.highlight);
    let disabled = Style::default()
        .fg(theme.muted)
        .add_modifier(Modifier::DIM);

    let mut actions = vec![("[s]tart", offered.start), ("[x]stop", offered.stop)];
    if offered.finish_visible {
        actions.push(("[f]inish", offered.finish));
    }
    actions.push(("[d]elete", offered.delete));

    let mut spans = vec![Span::raw("  ")];
    for (label, on) in actions {
        spans.push(Span::styled(label, if on { enabled } else { disabled }));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}
