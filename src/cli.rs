// CLI module - command-line argument parsing and handlers
//
// Without a subcommand the interactive board starts. Subcommands cover the
// same operations headlessly (login, task actions, the daily summary) plus
// configuration management:
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --edit: Open config file in $EDITOR
// - config --path: Print the config file location

use crate::api::{ApiError, TrackerApi};
use crate::auth::AuthContext;
use crate::board::{
    chart_slices, format_elapsed, format_time_spent, segment_widths, ActionError, CreateTaskForm,
    LoginForm, SignupForm, TaskService,
};
use crate::config::{Config, VERSION};
use crate::model::{DaySummary, SummaryTask, Task, TaskId, TaskStatus};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, IsTerminal, Write};
use std::process::Command;
use std::sync::Arc;

/// Terminal client for the task time tracker
#[derive(Parser)]
#[command(name = "tasktime")]
#[command(version = VERSION)]
#[command(about = "Track time against your tasks from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Create a new account
    Signup,

    /// Forget the stored session token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List and manage tasks
    Tasks {
        #[command(subcommand)]
        action: Option<TaskCommand>,
    },

    /// List recorded time sessions
    Sessions,

    /// Show today's summary
    Summary,

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// List tasks grouped by status (default)
    List,

    /// Show one task with its total tracked time
    Show { id: String },

    /// Create a task
    Add {
        name: String,

        /// Planned start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Planned end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Estimated effort in minutes
        #[arg(long)]
        effort: Option<String>,
    },

    /// Start timing a task
    Start { id: String },

    /// Stop the running timer for a task
    Stop { id: String },

    /// Mark a task completed
    Finish { id: String },

    /// Delete a task
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Config commands
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_config(show: bool, reset: bool, edit: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show();
        Ok(())
    } else if reset {
        handle_config_reset()
    } else if edit {
        handle_config_edit()
    } else {
        println!("Usage: tasktime config [--show|--reset|--edit|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn config_path() -> Result<std::path::PathBuf> {
    Config::config_path().context("Could not determine config path (no home directory)")
}

fn handle_config_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() -> Result<()> {
    let path = config_path()?;

    if path.exists() && !confirm(&format!("Config file exists at {}. Overwrite?", path.display()))? {
        println!("Aborted.");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().with_context(|| {
        format!(
            "Failed to launch editor '{}'. Set $EDITOR to your preferred editor",
            editor
        )
    })?;
    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Account commands
// ─────────────────────────────────────────────────────────────────────────────

/// Run a headless command against the service
pub async fn run(command: Commands, api: Arc<dyn TrackerApi>, auth: AuthContext) -> Result<()> {
    match command {
        Commands::Login { email } => login(api.as_ref(), &auth, email).await,
        Commands::Signup => signup(api.as_ref()).await,
        Commands::Logout => {
            auth.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => {
            require_login(&auth)?;
            let user = api.current_user().await.map_err(explain)?;
            println!("{} <{}>", user.display_name(), user.email);
            Ok(())
        }
        Commands::Tasks { action } => {
            require_login(&auth)?;
            tasks(api, action.unwrap_or(TaskCommand::List)).await
        }
        Commands::Sessions => {
            require_login(&auth)?;
            sessions(api.as_ref()).await
        }
        Commands::Summary => {
            require_login(&auth)?;
            let summary = api.day_summary().await.map_err(explain)?;
            print_summary(&summary);
            Ok(())
        }
        Commands::Config {
            show,
            reset,
            edit,
            path,
        } => handle_config(show, reset, edit, path),
    }
}

fn require_login(auth: &AuthContext) -> Result<()> {
    if !auth.is_authenticated() {
        bail!("Not logged in. Run `tasktime login` first.");
    }
    Ok(())
}

/// Turn an API failure into a message suited to a terminal user
fn explain(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Unauthorized => {
            anyhow::anyhow!("Session expired or invalid. Run `tasktime login` again.")
        }
        other => anyhow::anyhow!(other.user_message(crate::api::GENERIC_FAILURE)),
    }
}

fn explain_action(err: ActionError) -> anyhow::Error {
    if err.is_unauthorized() {
        return explain(ApiError::Unauthorized);
    }
    anyhow::Error::new(err)
}

async fn login(api: &dyn TrackerApi, auth: &AuthContext, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => prompt_line("Email")?,
    };
    let password = prompt_secret("Password")?;

    let form = LoginForm {
        email,
        password,
        focus: 0,
    };
    let (email, password) = form.validate()?;

    let token = api
        .login(&email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Login failed")))?;
    auth.login(token)?;

    println!("Logged in as {}", email);
    Ok(())
}

async fn signup(api: &dyn TrackerApi) -> Result<()> {
    let form = SignupForm {
        email: prompt_line("Email")?,
        first_name: prompt_line("First name")?,
        last_name: prompt_line("Last name")?,
        password: prompt_secret("Password")?,
        confirm_password: prompt_secret("Confirm password")?,
        focus: 0,
    };
    let request = form.validate()?;

    let message = api
        .signup(&request)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Email already exists or signup failed")))?;
    println!("{}", message);
    println!("Run `tasktime login --email {}` to continue.", request.email);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Task commands
// ─────────────────────────────────────────────────────────────────────────────

async fn tasks(api: Arc<dyn TrackerApi>, action: TaskCommand) -> Result<()> {
    // Stop needs the server's open sessions to know what is being timed
    let mut service = TaskService::new(api.clone(), true);
    service.load().await.map_err(explain)?;

    match action {
        TaskCommand::List => {
            print_task_list(&service);
            Ok(())
        }
        TaskCommand::Show { id } => {
            let id = TaskId::new(id);
            let task = api.get_task(&id).await.map_err(explain)?;
            print_task(&task, service.list().is_timing(&id));
            match api.total_time_spent(&id).await {
                Ok(spent) => println!("  Tracked:  {}", spent.render()),
                Err(e) => tracing::warn!(error = %e, "Could not fetch total time spent"),
            }
            Ok(())
        }
        TaskCommand::Add {
            name,
            start,
            end,
            effort,
        } => {
            let form = CreateTaskForm {
                name,
                planned_start: start.unwrap_or_default(),
                planned_end: end.unwrap_or_default(),
                effort_minutes: effort.unwrap_or_default(),
                ..Default::default()
            };
            let task = form.validate()?;
            let name = task.user_task_name.clone();
            service.create_task(task).await.map_err(explain_action)?;
            println!("Created task \"{}\"", name);
            Ok(())
        }
        TaskCommand::Start { id } => {
            service.start_timing(TaskId::new(id.clone())).await.map_err(explain_action)?;
            println!("Started timer for task {}", id);
            Ok(())
        }
        TaskCommand::Stop { id } => {
            service.stop_timing(TaskId::new(id.clone())).await.map_err(explain_action)?;
            println!("Stopped timer for task {}", id);
            Ok(())
        }
        TaskCommand::Finish { id } => {
            service.finish(TaskId::new(id.clone())).await.map_err(explain_action)?;
            println!("Task {} completed", id);
            Ok(())
        }
        TaskCommand::Delete { id, yes } => {
            let task_id = TaskId::new(id.clone());
            let name = service
                .list()
                .task(&task_id)
                .map(|t| t.user_task_name.clone())
                .unwrap_or_else(|| id.clone());
            if !yes && !confirm(&format!("Delete task \"{}\"?", name))? {
                println!("Aborted.");
                return Ok(());
            }
            service.remove(task_id).await.map_err(explain_action)?;
            println!("Deleted task {}", id);
            Ok(())
        }
    }
}

fn print_task_list(service: &TaskService) {
    let list = service.list();
    if list.tasks().is_empty() {
        println!("No tasks yet. Create one with `tasktime tasks add <name>`.");
        return;
    }

    let groups = list.partition();
    for status in TaskStatus::ALL {
        let group = groups.group(status);
        println!("{} ({})", status.label(), group.len());
        for task in group {
            let marker = if list.is_timing(&task.id) { "●" } else { " " };
            println!("  {} {:>6}  {}", marker, task.id, task.user_task_name);
        }
        println!();
    }
}

fn print_task(task: &Task, timing: bool) {
    println!("{} {}", task.id, task.user_task_name);
    println!("  Status:   {}{}", task.status, if timing { " (timing)" } else { "" });
    if let Some(start) = &task.planned_start_date {
        println!("  Start:    {}", start);
    }
    if let Some(end) = &task.planned_end_date {
        println!("  End:      {}", end);
    }
    if let Some(effort) = task.estimated_effort_min {
        println!("  Effort:   {} min", effort);
    }
}

async fn sessions(api: &dyn TrackerApi) -> Result<()> {
    let sessions = api.list_sessions().await.map_err(explain)?;
    if sessions.is_empty() {
        println!("No time sessions recorded.");
        return Ok(());
    }
    for s in sessions {
        let duration = match (s.duration_sec, s.is_active()) {
            (_, true) => "running".to_string(),
            (Some(secs), false) => format_elapsed(secs),
            (None, false) => "-".to_string(),
        };
        println!(
            "task {:>6}  {}  {:>9}  {}",
            s.task_id,
            s.start_time,
            duration,
            s.notes.unwrap_or_default()
        );
    }
    Ok(())
}

const CHART_WIDTH: u16 = 40;

fn print_summary(summary: &DaySummary) {
    println!("Today's Summary");
    println!();
    println!("  Total time tracked:  {}", summary.total_time_tracked);
    println!("  Tasks worked on:     {}", summary.tasks_worked_on_count);
    println!("  Tasks completed:     {}", summary.completed_tasks_count);
    println!();

    let slices = chart_slices(&summary.task_status_chart);
    let widths = segment_widths(&slices, CHART_WIDTH);
    let glyphs = ['░', '▒', '█'];
    let bar: String = widths
        .iter()
        .zip(glyphs)
        .map(|(w, g)| g.to_string().repeat(usize::from(*w)))
        .collect();
    println!("  [{:<width$}]", bar, width = usize::from(CHART_WIDTH));
    for (slice, glyph) in slices.iter().zip(glyphs) {
        println!(
            "   {} {:<12} {:>3}  ({}%)",
            glyph,
            slice.label(),
            slice.count,
            slice.percent()
        );
    }

    print_summary_group("Worked on", &summary.tasks_worked_on);
    print_summary_group("Completed", &summary.completed_tasks);
    print_summary_group("In Progress", &summary.in_progress_tasks);
    print_summary_group("Pending", &summary.pending_tasks);
}

fn print_summary_group(title: &str, tasks: &[SummaryTask]) {
    println!();
    println!("{} ({})", title, tasks.len());
    for task in tasks {
        println!(
            "  {:<40} {:>8}",
            task.user_task_name,
            format_time_spent(task.time_spent_seconds)
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Prompts
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read from stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Read a line without echo when attached to a terminal
fn prompt_secret(label: &str) -> Result<String> {
    if !std::io::stdin().is_terminal() {
        return prompt_line(label);
    }

    eprint!("{}: ", label);
    std::io::stderr().flush()?;

    crossterm::terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    let result = read_hidden();
    let _ = crossterm::terminal::disable_raw_mode();
    eprintln!();
    result
}

fn read_hidden() -> Result<String> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

    let mut buf = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(buf),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                bail!("Aborted")
            }
            KeyCode::Esc => bail!("Aborted"),
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char(c) => buf.push(c),
            _ => {}
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{} [y/N]", question))?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["tasktime"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn delete_takes_short_yes_flag() {
        let cli = Cli::try_parse_from(["tasktime", "tasks", "delete", "7", "-y"]).unwrap();
        match cli.command {
            Some(Commands::Tasks {
                action: Some(TaskCommand::Delete { id, yes }),
            }) => {
                assert_eq!(id, "7");
                assert!(yes);
            }
            _ => panic!("expected tasks delete"),
        }
    }

    #[test]
    fn add_keeps_optional_planning_fields_raw() {
        let cli = Cli::try_parse_from([
            "tasktime", "tasks", "add", "Write report", "--start", "2024-05-01", "--effort", "90",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Tasks {
                action:
                    Some(TaskCommand::Add {
                        name,
                        start,
                        end,
                        effort,
                    }),
            }) => {
                assert_eq!(name, "Write report");
                assert_eq!(start.as_deref(), Some("2024-05-01"));
                assert!(end.is_none());
                assert_eq!(effort.as_deref(), Some("90"));
            }
            _ => panic!("expected tasks add"),
        }
    }
}
