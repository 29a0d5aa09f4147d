//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Escape a value for a basic TOML string
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Config {
    /// Render the full config as a commented TOML document
    pub fn to_toml(&self) -> String {
        format!(
            r#"# tasktime configuration

# Tracker service base URL (TASKTIME_API_URL overrides)
api_url = {api_url}

# Where the login token is stored (TASKTIME_CREDENTIALS overrides)
credentials_path = {credentials_path}

# Per-request timeout in seconds (TASKTIME_TIMEOUT_SECS overrides)
request_timeout_secs = {timeout}

# Retry reads once on network failure or server error; writes are never retried
read_retry = {read_retry}

# Theme: dark, light, mono (TASKTIME_THEME overrides)
theme = {theme}

[ui]
# Resume timers for sessions still open on the server
restore_active_timers = {restore}
redraw_interval_ms = {redraw}
show_logs = {show_logs}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging (in addition to the TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = {log_file_rotation}  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            api_url = quoted(&self.api_url),
            credentials_path = quoted(&self.credentials_path.display().to_string()),
            timeout = self.request_timeout_secs,
            read_retry = self.read_retry,
            theme = quoted(&self.theme),
            restore = self.ui.restore_active_timers,
            redraw = self.ui.redraw_interval_ms,
            show_logs = self.ui.show_logs,
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.display().to_string()),
            log_file_rotation = quoted(self.logging.file_rotation.as_str()),
            log_file_prefix = quoted(&self.logging.file_prefix),
        )
    }
}
