// Modal system for TUI overlays
//
// Modals capture all input while open. Each one maps keys to a ModalAction
// and the event loop carries the action out against App.

use crate::model::TaskId;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions returned by modal input handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    Close,
    /// Field editing in the create form
    Edit(KeyEvent),
    SubmitCreate,
    ConfirmDelete(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Keyboard shortcuts
    Help,
    /// New task form; field state lives in `App::create_form`
    CreateTask,
    /// Delete confirmation for one task
    ConfirmDelete { id: TaskId, name: String },
}

impl Modal {
    pub fn handle_input(&self, key: KeyEvent) -> ModalAction {
        match self {
            Modal::Help => match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => ModalAction::Close,
                _ => ModalAction::None,
            },
            Modal::CreateTask => match key.code {
                KeyCode::Esc => ModalAction::Close,
                KeyCode::Enter => ModalAction::SubmitCreate,
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    ModalAction::SubmitCreate
                }
                _ => ModalAction::Edit(key),
            },
            Modal::ConfirmDelete { id, .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => ModalAction::ConfirmDelete(id.clone()),
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') => {
                    ModalAction::Close
                }
                _ => ModalAction::None,
            },
        }
    }
}
