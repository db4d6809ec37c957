//! # Command Context
//!
//! Read-only state handed to commands so they can decide relevance without
//! touching the view model.

use crate::repl::view_models::{InputMode, ViewModel};

/// Read-only snapshot of ViewModel state for commands
#[derive(Debug, Clone)]
pub struct ViewModelSnapshot {
    pub input_mode: InputMode,
    pub line: String,
    pub cursor: usize,
    pub terminal_dimensions: (u16, u16),
}

impl ViewModelSnapshot {
    /// Create snapshot from current ViewModel state
    pub fn from_view_model(view_model: &ViewModel) -> Self {
        Self {
            input_mode: view_model.input_mode(),
            line: view_model.line().text(),
            cursor: view_model.line().cursor(),
            terminal_dimensions: view_model.terminal_size(),
        }
    }

    pub fn line_is_empty(&self) -> bool {
        self.line.is_empty()
    }
}

/// Base context available to all commands
pub struct CommandContext {
    pub state: ViewModelSnapshot,
}

impl CommandContext {
    pub fn new(state: ViewModelSnapshot) -> Self {
        Self { state }
    }

    pub fn is_calculator(&self) -> bool {
        self.state.input_mode == InputMode::Calculator
    }
}
