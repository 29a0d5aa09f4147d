// App state for the TUI
//
// Holds every piece of interactive state and turns user intent into API
// requests. Requests run on spawned tasks and report back as `Completion`
// messages over an unbounded channel; the event loop feeds those into
// `App::apply` on the UI task, so view-model state is only ever touched here.

use super::components::Toast;
use super::modal::Modal;
use crate::api::{ApiResult, TrackerApi};
use crate::auth::{AuthContext, AuthState};
use crate::board::{
    active_task_ids, execute, Affordances, CardTimers, CreateTaskForm, LoadTicket, LoginForm,
    Mutation, MutationKind, MutationTicket, SignupForm, SummaryView, TaskList,
};
use crate::config::{Config, UiConfig};
use crate::logging::LogBuffer;
use crate::model::{DaySummary, Task, TaskId, TaskStatus, User};
use crate::theme::Theme;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Signup,
    Tasks,
    Summary,
}

impl Screen {
    /// Screens that need a stored credential
    pub fn is_gated(&self) -> bool {
        matches!(self, Screen::Tasks | Screen::Summary)
    }
}

/// Result of a spawned request, delivered back to the UI task
#[derive(Debug)]
pub enum Completion {
    Loaded {
        ticket: LoadTicket,
        result: ApiResult<Vec<Task>>,
    },
    ActiveSessions(ApiResult<Vec<TaskId>>),
    Mutated {
        ticket: MutationTicket,
        mutation: Mutation,
        result: ApiResult<()>,
    },
    Summary(ApiResult<DaySummary>),
    LoggedIn(ApiResult<String>),
    SignedUp(ApiResult<String>),
    User(ApiResult<User>),
}

const EXPIRED_NOTICE: &str = "Your session has expired. Please log in again.";

pub struct App {
    pub screen: Screen,
    pub theme: Theme,
    pub ui: UiConfig,
    pub log_buffer: LogBuffer,

    api: Arc<dyn TrackerApi>,
    auth: AuthContext,
    tx: mpsc::UnboundedSender<Completion>,

    // ─── Board ───────────────────────────────────────────────
    pub tasks: TaskList,
    pub timers: CardTimers,
    /// Index into `display_order()`
    pub selected: usize,
    pub summary: SummaryView,
    pub user: Option<User>,
    timers_restored: bool,

    // ─── Auth screens ────────────────────────────────────────
    pub login_form: LoginForm,
    pub signup_form: SignupForm,
    pub auth_error: Option<String>,
    /// Positive feedback on the login screen (signup success)
    pub auth_notice: Option<String>,
    pub auth_pending: bool,
    logging_out: bool,

    // ─── Overlays ────────────────────────────────────────────
    pub create_form: CreateTaskForm,
    pub modal: Option<Modal>,
    pub toast: Option<Toast>,

    /// Redraw tick counter for the loading spinner
    pub frame: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: &Config,
        api: Arc<dyn TrackerApi>,
        auth: AuthContext,
        log_buffer: LogBuffer,
        tx: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            screen: Screen::Login,
            theme: Theme::by_name(&config.theme),
            ui: config.ui.clone(),
            log_buffer,
            api,
            auth,
            tx,
            tasks: TaskList::new(),
            timers: CardTimers::default(),
            selected: 0,
            summary: SummaryView::default(),
            user: None,
            timers_restored: false,
            login_form: LoginForm::default(),
            signup_form: SignupForm::default(),
            auth_error: None,
            auth_notice: None,
            auth_pending: false,
            logging_out: false,
            create_form: CreateTaskForm::default(),
            modal: None,
            toast: None,
            frame: 0,
            should_quit: false,
        }
    }

    fn spawn<F>(&self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // Receiver gone means the UI is shutting down
            let _ = tx.send(request.await);
        });
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::error(message));
    }

    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    // ─── Auth lifecycle ─────────────────────────────────────────

    /// Follow the credential state; the only place screens switch on auth
    pub fn on_auth_change(&mut self, state: AuthState) {
        match state {
            AuthState::Authenticated => {
                self.auth_pending = false;
                self.auth_error = None;
                self.auth_notice = None;
                self.login_form = LoginForm::default();
                self.enter_board();
            }
            AuthState::Unauthenticated => {
                let expired = !self.logging_out && self.screen.is_gated();
                self.logging_out = false;
                self.leave_board();
                self.screen = Screen::Login;
                if expired {
                    self.auth_error = Some(EXPIRED_NOTICE.to_string());
                }
            }
        }
    }

    fn enter_board(&mut self) {
        self.tasks.reset();
        self.timers.clear();
        self.timers_restored = false;
        self.selected = 0;
        self.screen = Screen::Tasks;
        self.load_tasks();

        let api = self.api.clone();
        self.spawn(async move { Completion::User(api.current_user().await) });
    }

    fn leave_board(&mut self) {
        self.tasks.reset();
        self.timers.clear();
        self.summary = SummaryView::default();
        self.user = None;
        self.modal = None;
        self.create_form.reset();
    }

    pub fn submit_login(&mut self) {
        if self.auth_pending {
            return;
        }
        match self.login_form.validate() {
            Ok((email, password)) => {
                self.auth_error = None;
                self.auth_pending = true;
                let api = self.api.clone();
                self.spawn(async move { Completion::LoggedIn(api.login(&email, &password).await) });
            }
            Err(e) => self.auth_error = Some(e.to_string()),
        }
    }

    pub fn submit_signup(&mut self) {
        if self.auth_pending {
            return;
        }
        match self.signup_form.validate() {
            Ok(request) => {
                self.auth_error = None;
                self.auth_pending = true;
                let api = self.api.clone();
                self.spawn(async move { Completion::SignedUp(api.signup(&request).await) });
            }
            Err(e) => self.auth_error = Some(e.to_string()),
        }
    }

    pub fn logout(&mut self) {
        self.logging_out = true;
        if let Err(e) = self.auth.logout() {
            self.logging_out = false;
            tracing::error!(error = %e, "Logout failed");
            self.show_error("Could not remove stored credential");
        }
    }

    pub fn show_signup(&mut self) {
        self.auth_error = None;
        self.auth_notice = None;
        self.screen = Screen::Signup;
    }

    pub fn show_login(&mut self) {
        self.auth_error = None;
        self.screen = Screen::Login;
    }

    // ─── Board actions ──────────────────────────────────────────

    pub fn load_tasks(&mut self) {
        let ticket = self.tasks.begin_load();
        let api = self.api.clone();
        self.spawn(async move {
            Completion::Loaded {
                ticket,
                result: api.list_tasks().await,
            }
        });
    }

    pub fn show_summary(&mut self) {
        self.screen = Screen::Summary;
        self.summary = SummaryView::Loading;
        let api = self.api.clone();
        self.spawn(async move { Completion::Summary(api.day_summary().await) });
    }

    pub fn refresh(&mut self) {
        match self.screen {
            Screen::Tasks => self.load_tasks(),
            Screen::Summary => self.show_summary(),
            Screen::Login | Screen::Signup => {}
        }
    }

    pub fn show_tasks(&mut self) {
        if self.screen != Screen::Tasks {
            self.screen = Screen::Tasks;
            self.load_tasks();
        }
    }

    /// Check preconditions locally, then send the request
    pub fn request(&mut self, mutation: Mutation) {
        let ticket = match self.tasks.begin(&mutation) {
            Ok(ticket) => ticket,
            Err(rejected) => {
                tracing::debug!(%rejected, "Action refused");
                self.show_error(rejected.to_string());
                return;
            }
        };
        let api = self.api.clone();
        self.spawn(async move {
            let result = execute(api.as_ref(), &mutation).await;
            Completion::Mutated {
                ticket,
                mutation,
                result,
            }
        });
    }

    /// Tasks in on-screen order: Pending, In Progress, Completed groups
    pub fn display_order(&self) -> Vec<&Task> {
        let groups = self.tasks.partition();
        TaskStatus::ALL
            .iter()
            .flat_map(|s| groups.group(*s).to_vec())
            .collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.display_order().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.tasks.tasks().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn affordances(&self, task: &Task) -> Affordances {
        Affordances::for_card(task, self.tasks.is_timing(&task.id), self.tasks.is_busy(&task.id))
    }

    /// Run a card action on the selected task if the card offers it
    pub fn card_action(&mut self, kind: MutationKind) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let name = task.user_task_name.clone();
        let offered = self.affordances(task);

        match kind {
            MutationKind::Start if offered.start => self.request(Mutation::Start(id)),
            MutationKind::Stop if offered.stop => self.request(Mutation::Stop(id)),
            MutationKind::Finish if offered.finish => self.request(Mutation::Finish(id)),
            MutationKind::Remove if offered.delete => {
                self.modal = Some(Modal::ConfirmDelete { id, name });
            }
            _ => tracing::debug!(action = kind.verb(), "Action not available for this card"),
        }
    }

    pub fn open_create_form(&mut self) {
        self.create_form.reset();
        self.modal = Some(Modal::CreateTask);
    }

    pub fn submit_create(&mut self) {
        if self.tasks.is_creating() {
            return;
        }
        match self.create_form.validate() {
            Ok(task) => {
                self.create_form.error = None;
                self.request(Mutation::Create(task));
            }
            Err(e) => self.create_form.error = Some(e.to_string()),
        }
    }

    pub fn cycle_theme(&mut self) {
        self.theme = Theme::from_kind(self.theme.kind.next());
    }

    // ─── Completions ────────────────────────────────────────────

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Loaded { ticket, result } => {
                let succeeded = result.is_ok();
                if !self.tasks.finish_load(ticket, result) {
                    return;
                }
                self.clamp_selection();
                if succeeded && self.ui.restore_active_timers && !self.timers_restored {
                    self.timers_restored = true;
                    let api = self.api.clone();
                    self.spawn(async move {
                        Completion::ActiveSessions(active_task_ids(api.as_ref()).await)
                    });
                }
            }
            Completion::ActiveSessions(result) => match result {
                Ok(ids) => {
                    self.tasks.seed_timing(ids);
                }
                Err(e) => tracing::warn!(error = %e, "Could not restore active timers"),
            },
            Completion::Mutated {
                ticket,
                mutation,
                result,
            } => {
                let unauthorized = result.as_ref().is_err_and(|e| e.is_unauthorized());
                let followup = self.tasks.complete(ticket, &mutation, result);

                if let Some(message) = followup.error {
                    // The auth watch already routes to login
                    if unauthorized {
                        return;
                    }
                    if matches!(mutation, Mutation::Create(_)) {
                        self.create_form.error = Some(message);
                    } else {
                        self.show_error(message);
                    }
                    return;
                }

                if followup.close_form {
                    self.modal = None;
                    self.create_form.reset();
                    self.show_toast("✓ Task created");
                }
                if followup.reload && self.screen.is_gated() {
                    self.load_tasks();
                }
            }
            Completion::Summary(result) => {
                if self.screen == Screen::Summary {
                    self.summary = SummaryView::from_result(result);
                }
            }
            Completion::LoggedIn(result) => match result {
                // Screen switch follows from the auth watch
                Ok(token) => {
                    if let Err(e) = self.auth.login(token) {
                        self.auth_pending = false;
                        tracing::error!(error = %e, "Could not store credential");
                        self.auth_error = Some("Could not store credential".to_string());
                    }
                }
                Err(e) => {
                    self.auth_pending = false;
                    self.auth_error = Some(e.user_message("Login failed. Please check your credentials."));
                }
            },
            Completion::SignedUp(result) => {
                self.auth_pending = false;
                match result {
                    Ok(message) => {
                        self.login_form = LoginForm {
                            email: self.signup_form.email.trim().to_string(),
                            password: String::new(),
                            focus: 1,
                        };
                        self.signup_form = SignupForm::default();
                        self.auth_notice = Some(message);
                        self.screen = Screen::Login;
                    }
                    Err(e) => {
                        self.auth_error = Some(e.user_message("Email already exists or signup failed"));
                    }
                }
            }
            Completion::User(result) => match result {
                Ok(user) => self.user = Some(user),
                Err(e) => tracing::debug!(error = %e, "Profile unavailable"),
            },
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.tasks.tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Advance card timers to `now` and drop an expired toast
    pub fn tick(&mut self, now: Instant) {
        self.frame = self.frame.wrapping_add(1);
        let tasks = &self.tasks;
        self.timers
            .reconcile(tasks.tasks(), |id| tasks.is_timing(id), now);
        self.clear_expired_toast();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::auth::CredentialStore;
    use crate::board::service::fake::{task, FakeApi};

    struct Harness {
        app: App,
        rx: mpsc::UnboundedReceiver<Completion>,
        api: Arc<FakeApi>,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        async fn new(tasks: Vec<Task>, logged_in: bool) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = CredentialStore::new(dir.path().join("credentials"));
            if logged_in {
                store.save("token").unwrap();
            }
            let auth = AuthContext::probe(store);
            let api = Arc::new(FakeApi::with_tasks(tasks));
            let (tx, rx) = mpsc::unbounded_channel();
            let mut config = Config::default();
            config.ui.restore_active_timers = false;
            let app = App::new(&config, api.clone(), auth, LogBuffer::new(), tx);
            Self {
                app,
                rx,
                api,
                _dir: dir,
            }
        }

        /// Deliver completions until `n` have been applied
        async fn pump(&mut self, n: usize) {
            for _ in 0..n {
                let completion = self.rx.recv().await.unwrap();
                self.app.apply(completion);
            }
        }
    }

    #[tokio::test]
    async fn authenticated_start_lands_on_board_and_loads() {
        let mut h = Harness::new(vec![task(1, TaskStatus::Pending)], true).await;
        h.app.on_auth_change(AuthState::Authenticated);
        assert_eq!(h.app.screen, Screen::Tasks);

        // list_tasks and current_user
        h.pump(2).await;
        assert_eq!(h.app.tasks.tasks().len(), 1);
        assert!(h.app.user.is_some());
    }

    #[tokio::test]
    async fn start_then_reload_marks_card_timing() {
        let mut h = Harness::new(vec![task(1, TaskStatus::Pending)], true).await;
        h.app.on_auth_change(AuthState::Authenticated);
        h.pump(2).await;

        h.app.card_action(MutationKind::Start);
        assert!(h.app.tasks.is_busy(&TaskId::from(1)));
        h.pump(1).await;
        assert!(h.app.tasks.is_timing(&TaskId::from(1)));

        // Follow-up reload
        h.pump(1).await;
        assert_eq!(h.app.tasks.tasks()[0].status, TaskStatus::InProgress);

        let t0 = Instant::now();
        h.app.tick(t0);
        assert!(h.app.timers.get(&TaskId::from(1)).is_timing());
    }

    #[tokio::test]
    async fn delete_on_completed_card_opens_nothing() {
        let mut h = Harness::new(vec![task(1, TaskStatus::Completed)], true).await;
        h.app.on_auth_change(AuthState::Authenticated);
        h.pump(2).await;

        h.app.card_action(MutationKind::Remove);
        assert!(h.app.modal.is_none());
        assert!(!h.api.calls().contains(&"delete_task".to_string()));
    }

    #[tokio::test]
    async fn invalid_create_form_stays_open_without_request() {
        let mut h = Harness::new(vec![], true).await;
        h.app.on_auth_change(AuthState::Authenticated);
        h.pump(2).await;

        h.app.open_create_form();
        h.app.create_form.name = "x".to_string();
        h.app.create_form.effort_minutes = "0".to_string();
        h.app.submit_create();
        assert!(h.app.create_form.error.is_some());
        assert!(matches!(h.app.modal, Some(Modal::CreateTask)));
        assert!(!h.app.tasks.is_creating());
    }

    #[tokio::test]
    async fn successful_create_closes_modal_and_reloads() {
        let mut h = Harness::new(vec![], true).await;
        h.app.on_auth_change(AuthState::Authenticated);
        h.pump(2).await;

        h.app.open_create_form();
        h.app.create_form.name = "Write report".to_string();
        h.app.submit_create();
        h.pump(1).await;
        assert!(h.app.modal.is_none());

        h.pump(1).await;
        assert_eq!(h.app.tasks.tasks()[0].user_task_name, "Write report");
    }

    #[tokio::test]
    async fn unauthorized_mid_session_returns_to_login_with_notice() {
        let mut h = Harness::new(vec![task(1, TaskStatus::Pending)], true).await;
        h.app.on_auth_change(AuthState::Authenticated);
        h.pump(2).await;

        h.api.fail_next(ApiError::Unauthorized);
        h.app.card_action(MutationKind::Start);
        h.pump(1).await;
        // No toast: the watch-driven transition reports it
        assert!(h.app.toast.is_none());

        h.app.on_auth_change(AuthState::Unauthenticated);
        assert_eq!(h.app.screen, Screen::Login);
        assert_eq!(h.app.auth_error.as_deref(), Some(EXPIRED_NOTICE));
        assert!(h.app.tasks.tasks().is_empty());
    }

    #[tokio::test]
    async fn start_completing_after_relogin_does_not_time_new_session() {
        let mut h = Harness::new(vec![task(1, TaskStatus::Pending)], true).await;
        h.app.on_auth_change(AuthState::Authenticated);
        h.pump(2).await;

        h.app.card_action(MutationKind::Start);
        h.app.on_auth_change(AuthState::Unauthenticated);
        h.app.on_auth_change(AuthState::Authenticated);

        // Start result, the new list and the new user, in any order
        h.pump(3).await;
        assert!(h.app.tasks.timing().is_empty());
        assert!(!h.app.tasks.is_busy(&TaskId::from(1)));
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn explicit_logout_shows_no_expiry_notice() {
        let mut h = Harness::new(vec![], true).await;
        h.app.on_auth_change(AuthState::Authenticated);
        h.pump(2).await;

        h.app.logout();
        h.app.on_auth_change(AuthState::Unauthenticated);
        assert_eq!(h.app.screen, Screen::Login);
        assert!(h.app.auth_error.is_none());
    }

    #[tokio::test]
    async fn signup_success_prefills_login() {
        let mut h = Harness::new(vec![], false).await;
        h.app.show_signup();
        h.app.signup_form = SignupForm {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            focus: 0,
        };
        h.app.submit_signup();
        h.pump(1).await;

        assert_eq!(h.app.screen, Screen::Login);
        assert_eq!(h.app.login_form.email, "ada@example.com");
        assert!(h.app.auth_notice.is_some());
    }

    #[tokio::test]
    async fn signup_validation_blocks_request() {
        let mut h = Harness::new(vec![], false).await;
        h.app.show_signup();
        h.app.signup_form.email = "a@b.c".to_string();
        h.app.submit_signup();
        assert!(h.app.auth_error.is_some());
        assert!(!h.app.auth_pending);
        assert!(h.api.calls().is_empty());
    }
}
