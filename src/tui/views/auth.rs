// Login and signup screens
//
// Both are a centered card of text fields with a message line under them.
// Validation errors and server failures show in the error color, the
// post-signup notice in the success color.

use super::text_field;
use crate::board::SignupForm;
use crate::tui::app::App;
use crate::tui::layout::centered_rect;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const CARD_WIDTH: u16 = 56;
const FIELD_HEIGHT: u16 = 3;
const MESSAGE_HEIGHT: u16 = 3;

pub fn render_login(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.login_form;
    let fields = [("Email", form.email.as_str(), false), ("Password", form.password.as_str(), true)];
    let pending = app.auth_pending.then_some("Logging in…");
    render_card(f, area, app, " Log in ", &fields, form.focus, pending);
}

pub fn render_signup(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.signup_form;
    let values = form.values();
    let fields: Vec<(&str, &str, bool)> = SignupForm::LABELS
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (label, value))| (*label, value, SignupForm::is_secret(i)))
        .collect();
    let pending = app.auth_pending.then_some("Creating account…");
    render_card(f, area, app, " Create account ", &fields, form.focus, pending);
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    app: &App,
    title: &str,
    fields: &[(&str, &str, bool)],
    focus: usize,
    pending: Option<&str>,
) {
    let theme = &app.theme;
    let height = fields.len() as u16 * FIELD_HEIGHT + MESSAGE_HEIGHT + 2;
    let card = centered_rect(CARD_WIDTH, height, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.title))
        .title(title)
        .title_alignment(Alignment::Center);
    let inner = block.inner(card);
    f.render_widget(block, card);

    let mut constraints: Vec<Constraint> =
        fields.iter().map(|_| Constraint::Length(FIELD_HEIGHT)).collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, (label, value, secret)) in fields.iter().enumerate() {
        let focused = i == focus && pending.is_none() && app.modal.is_none();
        text_field(f, rows[i], label, value, *secret, focused, theme);
    }

    let message = if let Some(text) = pending {
        Line::styled(text.to_string(), Style::default().fg(theme.muted))
    } else if let Some(error) = &app.auth_error {
        Line::styled(
            error.clone(),
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        )
    } else if let Some(notice) = &app.auth_notice {
        Line::styled(notice.clone(), Style::default().fg(theme.success))
    } else {
        Line::default()
    };

    f.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[fields.len()],
    );
}
