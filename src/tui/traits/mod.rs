//! Input traits for TUI widgets
//!
//! The event loop routes keys Modal → Global → Screen. Widgets that edit
//! their own state implement [`Interactive`] and report whether they
//! consumed a key so the caller knows when to fall through.

use crate::board::FieldCursor;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Yes,
    No,
}

impl From<bool> for Handled {
    fn from(handled: bool) -> Self {
        if handled {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Something that consumes keyboard input
pub trait Interactive {
    fn handle_key(&mut self, key: KeyEvent) -> Handled;
}

/// Every multi-field form edits the same way: Tab/arrows move focus,
/// printable characters append, Backspace deletes.
impl<T: FieldCursor> Interactive for T {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.prev_field(),
            KeyCode::Backspace => self.pop_char(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.push_char(c)
            }
            _ => return Handled::No,
        }
        Handled::Yes
    }
}
