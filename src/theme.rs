// Theme system for the TUI
//
// A handful of built-in palettes selected by name from config. Every color
// the views use lives here so rendering code never names a raw color.

use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Built-in palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    /// Terminal defaults only, for low-color terminals
    Mono,
}

impl ThemeKind {
    pub fn all() -> &'static [ThemeKind] {
        &[ThemeKind::Dark, ThemeKind::Light, ThemeKind::Mono]
    }

    /// Case-insensitive lookup; unknown names fall back to Dark
    pub fn from_name(name: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
            ThemeKind::Mono => "mono",
        }
    }

    /// Cycle order for the in-app theme toggle
    pub fn next(self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|&k| k == self).unwrap_or(0);
        all[(current + 1) % all.len()]
    }
}

/// Resolved colors for one palette
#[derive(Debug, Clone)]
pub struct Theme {
    pub kind: ThemeKind,

    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight: Color,
    pub title: Color,
    pub status_bar: Color,

    pub selection: Color,
    pub selection_fg: Color,

    pub error: Color,
    pub success: Color,
    pub timing: Color,

    // ─── Status identity (cards, chart segments, legend) ─────
    pub pending: Color,
    pub in_progress: Color,
    pub completed: Color,

    // ─── Log strip ───────────────────────────────────────────
    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,

    pub border_type: BorderType,
}

impl Theme {
    pub fn by_name(name: &str) -> Self {
        Self::from_kind(ThemeKind::from_name(name))
    }

    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self::dark(),
            ThemeKind::Light => Self::light(),
            ThemeKind::Mono => Self::mono(),
        }
    }

    fn dark() -> Self {
        Self {
            kind: ThemeKind::Dark,
            background: Color::Rgb(24, 26, 33),
            foreground: Color::Rgb(220, 223, 228),
            muted: Color::Rgb(110, 118, 129),
            border: Color::Rgb(62, 68, 81),
            highlight: Color::Rgb(97, 175, 239),
            title: Color::Rgb(97, 175, 239),
            status_bar: Color::Rgb(150, 156, 166),
            selection: Color::Rgb(44, 49, 60),
            selection_fg: Color::Rgb(255, 255, 255),
            error: Color::Rgb(224, 108, 117),
            success: Color::Rgb(152, 195, 121),
            timing: Color::Rgb(229, 192, 123),
            pending: Color::Rgb(229, 192, 123),
            in_progress: Color::Rgb(97, 175, 239),
            completed: Color::Rgb(152, 195, 121),
            log_error: Color::Rgb(224, 108, 117),
            log_warn: Color::Rgb(229, 192, 123),
            log_info: Color::Rgb(171, 178, 191),
            log_debug: Color::Rgb(110, 118, 129),
            border_type: BorderType::Rounded,
        }
    }

    fn light() -> Self {
        Self {
            kind: ThemeKind::Light,
            background: Color::Rgb(250, 250, 250),
            foreground: Color::Rgb(56, 58, 66),
            muted: Color::Rgb(160, 161, 167),
            border: Color::Rgb(200, 200, 205),
            highlight: Color::Rgb(64, 120, 242),
            title: Color::Rgb(64, 120, 242),
            status_bar: Color::Rgb(105, 108, 119),
            selection: Color::Rgb(229, 229, 230),
            selection_fg: Color::Rgb(20, 20, 20),
            error: Color::Rgb(228, 86, 73),
            success: Color::Rgb(80, 161, 79),
            timing: Color::Rgb(193, 132, 1),
            pending: Color::Rgb(193, 132, 1),
            in_progress: Color::Rgb(64, 120, 242),
            completed: Color::Rgb(80, 161, 79),
            log_error: Color::Rgb(228, 86, 73),
            log_warn: Color::Rgb(193, 132, 1),
            log_info: Color::Rgb(56, 58, 66),
            log_debug: Color::Rgb(160, 161, 167),
            border_type: BorderType::Rounded,
        }
    }

    fn mono() -> Self {
        Self {
            kind: ThemeKind::Mono,
            background: Color::Reset,
            foreground: Color::Reset,
            muted: Color::DarkGray,
            border: Color::Gray,
            highlight: Color::White,
            title: Color::White,
            status_bar: Color::Gray,
            selection: Color::DarkGray,
            selection_fg: Color::White,
            error: Color::Red,
            success: Color::Green,
            timing: Color::Yellow,
            pending: Color::Yellow,
            in_progress: Color::Cyan,
            completed: Color::Green,
            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Reset,
            log_debug: Color::DarkGray,
            border_type: BorderType::Plain,
        }
    }

    /// Identity color for a task status
    pub fn status(&self, status: crate::model::TaskStatus) -> Color {
        use crate::model::TaskStatus;
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_with_fallback() {
        assert_eq!(ThemeKind::from_name("Light"), ThemeKind::Light);
        assert_eq!(ThemeKind::from_name(" MONO "), ThemeKind::Mono);
        assert_eq!(ThemeKind::from_name("solarized"), ThemeKind::Dark);
    }

    #[test]
    fn cycle_visits_every_theme() {
        let mut kind = ThemeKind::Dark;
        for _ in 0..ThemeKind::all().len() {
            kind = kind.next();
        }
        assert_eq!(kind, ThemeKind::Dark);
    }
}
