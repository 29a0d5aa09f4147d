//! Interactive UI settings

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    /// Seed the timing set from the server's open sessions after first load
    pub restore_active_timers: bool,
    /// Redraw cadence while idle
    pub redraw_interval_ms: u64,
    /// Show the log strip under the board
    pub show_logs: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            restore_active_timers: true,
            redraw_interval_ms: 250,
            show_logs: false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileUi {
    pub restore_active_timers: Option<bool>,
    pub redraw_interval_ms: Option<u64>,
    pub show_logs: Option<bool>,
}

impl UiConfig {
    pub fn from_file(file: Option<FileUi>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            restore_active_timers: file
                .restore_active_timers
                .unwrap_or(defaults.restore_active_timers),
            // Below ~50ms the loop just burns CPU
            redraw_interval_ms: file
                .redraw_interval_ms
                .map(|ms| ms.max(50))
                .unwrap_or(defaults.redraw_interval_ms),
            show_logs: file.show_logs.unwrap_or(defaults.show_logs),
        }
    }
}
