// Today's summary view
//
// Three headline figures, a proportional status bar with legend, then the
// four task lists with time spent per task.

use super::centered_line;
use crate::board::{chart_slices, format_time_spent, segment_widths, SummaryView};
use crate::model::{DaySummary, StatusDistribution, SummaryTask};
use crate::theme::Theme;
use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    match &app.summary {
        SummaryView::Loading => centered_line(
            f,
            area,
            Line::styled("Loading summary…", Style::default().fg(theme.muted)),
        ),
        SummaryView::Failed(message) => centered_line(
            f,
            area,
            Line::styled(message.clone(), Style::default().fg(theme.error)),
        ),
        SummaryView::Ready(summary) => render_summary(f, area, summary, theme),
    }
}

fn render_summary(f: &mut Frame, area: Rect, summary: &DaySummary, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(4),
        ])
        .split(area);

    render_stats(f, rows[0], summary, theme);
    render_chart(f, rows[1], &summary.task_status_chart, theme);
    render_lists(f, rows[2], summary, theme);
}

fn render_stats(f: &mut Frame, area: Rect, summary: &DaySummary, theme: &Theme) {
    let total = if summary.total_time_tracked.is_empty() {
        format_time_spent(summary.total_time_tracked_seconds)
    } else {
        summary.total_time_tracked.clone()
    };
    let stats = [
        ("Total time tracked", total),
        ("Tasks worked on", summary.tasks_worked_on_count.to_string()),
        ("Tasks completed", summary.completed_tasks_count.to_string()),
    ];

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    for ((label, value), col) in stats.into_iter().zip(cols.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
            .title(format!(" {} ", label));
        f.render_widget(
            Paragraph::new(value)
                .alignment(Alignment::Center)
                .style(
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD),
                )
                .block(block),
            *col,
        );
    }
}

fn render_chart(f: &mut Frame, area: Rect, dist: &StatusDistribution, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
        .title(" Task Status ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if dist.total() == 0 {
        f.render_widget(
            Paragraph::new(Line::styled("No tasks yet", Style::default().fg(theme.muted)))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let slices = chart_slices(dist);
    let widths = segment_widths(&slices, inner.width);

    let bar: Vec<Span> = slices
        .iter()
        .zip(widths)
        .filter(|(_, w)| *w > 0)
        .map(|(slice, w)| {
            Span::styled(
                "█".repeat(usize::from(w)),
                Style::default().fg(theme.status(slice.status)),
            )
        })
        .collect();

    let mut legend = Vec::new();
    for slice in &slices {
        legend.push(Span::styled("■ ", Style::default().fg(theme.status(slice.status))));
        legend.push(Span::styled(
            format!("{} {} ({}%)   ", slice.label(), slice.count, slice.percent()),
            Style::default().fg(theme.foreground),
        ));
    }

    f.render_widget(
        Paragraph::new(vec![Line::from(bar), Line::from(legend)]),
        inner,
    );
}

fn render_lists(f: &mut Frame, area: Rect, summary: &DaySummary, theme: &Theme) {
    let groups = [
        ("Worked on today", &summary.tasks_worked_on),
        ("Completed", &summary.completed_tasks),
        ("In Progress", &summary.in_progress_tasks),
        ("Pending", &summary.pending_tasks),
    ];

    let direction = if Breakpoint::from_width(area.width).side_by_side() {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };
    let regions = Layout::default()
        .direction(direction)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((title, tasks), region) in groups.into_iter().zip(regions.iter()) {
        render_task_list(f, *region, title, tasks, theme);
    }
}

fn render_task_list(f: &mut Frame, area: Rect, title: &str, tasks: &[SummaryTask], theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" {} ({}) ", title, tasks.len()));

    if tasks.is_empty() {
        f.render_widget(
            Paragraph::new(Line::styled("None", Style::default().fg(theme.muted))).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            ListItem::new(Line::from(vec![
                Span::styled(task.user_task_name.as_str(), Style::default().fg(theme.foreground)),
                Span::styled(
                    format!("  {}", format_time_spent(task.time_spent_seconds)),
                    Style::default().fg(theme.muted),
                ),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
