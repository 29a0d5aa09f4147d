// TaskTime - terminal client for a task and time-tracking service
//
// Lists the user's tasks grouped by status, runs per-task timers against
// the server's session endpoints, and shows a daily summary.
//
// Architecture:
// - API (reqwest): typed client for the tracker's REST endpoints
// - Auth: persisted token plus a watch channel that broadcasts login state
// - Board: task list view-model, card timers, forms, summary derivation
// - TUI (ratatui): interactive board driven by a tokio::select! loop
// - CLI (clap): the same operations as one-shot subcommands

mod api;
mod auth;
mod board;
mod cli;
mod config;
mod logging;
mod model;
mod theme;
mod tui;

use anyhow::{Context, Result};
use api::{ApiClient, TrackerApi};
use auth::{AuthContext, CredentialStore};
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, LogRotation, LoggingConfig};
use logging::{LogBuffer, TuiLogLayer};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config management never touches the network or the log files
    if let Some(Commands::Config {
        show,
        reset,
        edit,
        path,
    }) = cli.command
    {
        return cli::handle_config(show, reset, edit, path);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env();
    let tui_mode = cli.command.is_none();

    let log_buffer = LogBuffer::new();
    // Keep the guard alive until exit so buffered file logs flush
    let _file_guard = init_logging(&config.logging, tui_mode, &log_buffer);

    tracing::info!(
        version = config::VERSION,
        api_url = %config.api_url,
        "TaskTime starting"
    );

    let auth = AuthContext::probe(CredentialStore::new(config.credentials_path.clone()));
    let api: Arc<dyn TrackerApi> = Arc::new(
        ApiClient::new(
            config.api_url.clone(),
            auth.clone(),
            config.request_timeout(),
            config.read_retry,
        )
        .context("Failed to build HTTP client")?,
    );

    match cli.command {
        Some(command) => cli::run(command, api, auth).await,
        None => {
            let result = tui::run_tui(config, api, auth, log_buffer).await;
            if let Err(e) = &result {
                tracing::error!("TUI error: {:?}", e);
            }
            tracing::info!("Shutdown complete");
            result
        }
    }
}

/// Initialize tracing.
///
/// In TUI mode events go to the in-memory buffer (stderr would garble the
/// display); otherwise to stderr so stdout stays clean for command output.
/// File logging adds a rotating JSON layer on top of either.
///
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_logging(
    logging: &LoggingConfig,
    tui_mode: bool,
    log_buffer: &LogBuffer,
) -> Option<WorkerGuard> {
    let default_filter = format!("tasktime={}", logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let mut guard = None;
    let file_layer = if logging.file_enabled {
        match std::fs::create_dir_all(&logging.file_dir) {
            Ok(()) => {
                let appender = match logging.file_rotation {
                    LogRotation::Hourly => {
                        tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix)
                    }
                    LogRotation::Daily => {
                        tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix)
                    }
                    LogRotation::Never => {
                        tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix)
                    }
                };
                let (non_blocking, file_guard) = tracing_appender::non_blocking(appender);
                guard = Some(file_guard);
                Some(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    logging.file_dir, e
                );
                None
            }
        }
    } else {
        None
    };

    let tui_layer = tui_mode.then(|| TuiLogLayer::new(log_buffer.clone()));
    let stderr_layer =
        (!tui_mode).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}
