// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - The event loop: keyboard input, redraw ticks, request completions
//   and credential changes
// - Layered key dispatch

pub mod app;
pub mod components;
pub mod layout;
pub mod modal;
pub mod traits;
pub mod views;

use crate::api::TrackerApi;
use crate::auth::{AuthContext, AuthState};
use crate::board::{Mutation, MutationKind};
use crate::config::Config;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, Completion, Screen};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use modal::{Modal, ModalAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use traits::{Handled, Interactive};

/// Run the TUI
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal even when the loop fails.
pub async fn run_tui(
    config: Config,
    api: Arc<dyn TrackerApi>,
    auth: AuthContext,
    log_buffer: LogBuffer,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (tx, mut completions) = mpsc::unbounded_channel();
    let mut auth_rx = auth.subscribe();
    let mut app = App::new(&config, api, auth, log_buffer, tx);

    // Stored credential decides the first screen
    let initial = *auth_rx.borrow_and_update();
    tracing::info!(authenticated = initial == AuthState::Authenticated, "Starting TUI");
    app.on_auth_change(initial);

    let result = run_event_loop(&mut terminal, &mut app, &mut completions, &mut auth_rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on four sources at once and redraws after whichever fires:
/// 1. Terminal input
/// 2. The redraw tick, which also advances card timers
/// 3. Completions from spawned requests
/// 4. Credential state changes (login, logout, expiry)
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    completions: &mut mpsc::UnboundedReceiver<Completion>,
    auth_rx: &mut watch::Receiver<AuthState>,
) -> Result<()> {
    let mut input = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(app.ui.redraw_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key_event(app, key);
                }
                // Resize and the rest just redraw
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal input"),
                None => break,
            },

            _ = ticker.tick() => {}

            Some(completion) = completions.recv() => app.apply(completion),

            changed = auth_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *auth_rx.borrow_and_update();
                tracing::info!(?state, "Credential state changed");
                app.on_auth_change(state);
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Modal → Global → Screen
fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if handle_modal_input(app, key) {
        return;
    }

    if handle_global_keys(app, key) {
        return;
    }

    match app.screen {
        Screen::Login => handle_login_keys(app, key),
        Screen::Signup => handle_signup_keys(app, key),
        Screen::Tasks => handle_board_keys(app, key),
        Screen::Summary => {
            if key.code == KeyCode::Char('r') {
                app.refresh();
            }
        }
    }
}

/// Modal captures all input while open
fn handle_modal_input(app: &mut App, key: KeyEvent) -> bool {
    let Some(modal) = &app.modal else {
        return false;
    };

    match modal.handle_input(key) {
        ModalAction::None => {}
        ModalAction::Close => app.modal = None,
        ModalAction::Edit(key) => {
            if !app.tasks.is_creating() {
                app.create_form.handle_key(key);
            }
        }
        ModalAction::SubmitCreate => app.submit_create(),
        ModalAction::ConfirmDelete(id) => {
            app.modal = None;
            app.request(Mutation::Remove(id));
        }
    }
    true
}

/// Keys that work on both board screens. Auth screens take every key as
/// text, so nothing here applies to them.
fn handle_global_keys(app: &mut App, key: KeyEvent) -> bool {
    if !app.screen.is_gated() {
        return false;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.modal = Some(Modal::Help),
        KeyCode::Char('1') => app.show_tasks(),
        KeyCode::Char('2') => app.show_summary(),
        KeyCode::Tab => {
            if app.screen == Screen::Tasks {
                app.show_summary();
            } else {
                app.show_tasks();
            }
        }
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('L') => app.logout(),
        _ => return false,
    }
    true
}

fn handle_board_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('s') => app.card_action(MutationKind::Start),
        KeyCode::Char('x') => app.card_action(MutationKind::Stop),
        KeyCode::Char('f') => app.card_action(MutationKind::Finish),
        KeyCode::Char('d') | KeyCode::Delete => app.card_action(MutationKind::Remove),
        KeyCode::Char('n') => app.open_create_form(),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
}

fn handle_login_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_login(),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => app.show_signup(),
        _ if app.auth_pending => {}
        _ => {
            if app.login_form.handle_key(key) == Handled::Yes {
                app.auth_error = None;
            }
        }
    }
}

fn handle_signup_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_signup(),
        KeyCode::Esc => app.show_login(),
        _ if app.auth_pending => {}
        _ => {
            if app.signup_form.handle_key(key) == Handled::Yes {
                app.auth_error = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use crate::board::service::fake::{task, FakeApi};
    use crate::model::TaskStatus;

    fn app() -> (App, mpsc::UnboundedReceiver<Completion>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let auth = AuthContext::probe(CredentialStore::new(dir.path().join("credentials")));
        let api = Arc::new(FakeApi::with_tasks(vec![task(1, TaskStatus::Pending)]));
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(&Config::default(), api, auth, LogBuffer::new(), tx);
        (app, rx, dir)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn letters_on_login_are_text_not_commands() {
        let (mut app, _rx, _dir) = app();
        for c in "quit".chars() {
            handle_key_event(&mut app, press(KeyCode::Char(c)));
        }
        assert!(!app.should_quit);
        assert_eq!(app.login_form.email, "quit");
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_any_screen() {
        let (mut app, _rx, _dir) = app();
        app.open_create_form();
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn modal_swallows_board_keys() {
        let (mut app, mut rx, _dir) = app();
        app.on_auth_change(AuthState::Authenticated);
        app.apply(rx.recv().await.unwrap());
        app.apply(rx.recv().await.unwrap());

        handle_key_event(&mut app, press(KeyCode::Char('?')));
        assert_eq!(app.modal, Some(Modal::Help));

        // 's' would start a timer on the board
        handle_key_event(&mut app, press(KeyCode::Char('s')));
        assert!(app.tasks.timing().is_empty());
        assert!(!app.tasks.is_busy(&crate::model::TaskId::from(1)));

        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn create_modal_edits_form_fields() {
        let (mut app, mut rx, _dir) = app();
        app.on_auth_change(AuthState::Authenticated);
        app.apply(rx.recv().await.unwrap());
        app.apply(rx.recv().await.unwrap());

        handle_key_event(&mut app, press(KeyCode::Char('n')));
        for c in "Plan".chars() {
            handle_key_event(&mut app, press(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, press(KeyCode::Tab));
        handle_key_event(&mut app, press(KeyCode::Char('2')));

        assert_eq!(app.create_form.name, "Plan");
        assert_eq!(app.create_form.planned_start, "2");
        assert_eq!(app.screen, Screen::Tasks);
    }
}
