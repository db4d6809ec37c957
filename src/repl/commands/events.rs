//! # Command Events
//!
//! Events produced by commands that describe what should happen.
//! Commands produce these events, and the controller applies them to the
//! view model or hands them to the engine. Commands suggest, the controller
//! decides.

/// Direction for cursor movement and single-char deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementDirection {
    Left,
    Right,
    LineStart,
    LineEnd,
    WordBackward,
    WordForward,
}

/// What a kill command removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillScope {
    /// Ctrl+K
    ToLineEnd,
    /// Ctrl+U
    WholeLine,
    /// Ctrl+W
    WordBackward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Previous,
    Next,
}

/// Events that commands can produce to request changes
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEvent {
    CursorMoveRequested { direction: MovementDirection },

    TextInsertRequested { text: String },

    /// Only `Left` (backspace) and `Right` (delete) are meaningful
    TextDeleteRequested { direction: MovementDirection },

    KillRequested { scope: KillScope },

    YankRequested,

    HistoryNavigationRequested { direction: HistoryDirection },

    /// Enter: submit the line to the engine or answer the open question
    SubmitRequested,

    CompletionRequested,

    /// Ctrl+C
    InterruptRequested,

    /// Ctrl+L
    ClearScreenRequested,

    /// F1
    ShowReadmeRequested,

    /// F2: download the engine again
    UpdateEngineRequested,

    /// F3
    ShowAboutRequested,

    TerminalResizeRequested { width: u16, height: u16 },

    QuitRequested,

    /// No action needed (for commands that only query state)
    NoAction,
}

impl CommandEvent {
    pub fn cursor_move(direction: MovementDirection) -> Self {
        Self::CursorMoveRequested { direction }
    }

    pub fn text_insert(text: impl Into<String>) -> Self {
        Self::TextInsertRequested { text: text.into() }
    }

    pub fn text_delete(direction: MovementDirection) -> Self {
        Self::TextDeleteRequested { direction }
    }

    pub fn kill(scope: KillScope) -> Self {
        Self::KillRequested { scope }
    }

    pub fn history(direction: HistoryDirection) -> Self {
        Self::HistoryNavigationRequested { direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_event_should_create_cursor_move() {
        assert_eq!(
            CommandEvent::cursor_move(MovementDirection::WordForward),
            CommandEvent::CursorMoveRequested {
                direction: MovementDirection::WordForward
            }
        );
    }

    #[test]
    fn command_event_should_create_text_insert() {
        assert_eq!(
            CommandEvent::text_insert('x'.to_string()),
            CommandEvent::TextInsertRequested {
                text: "x".to_string()
            }
        );
    }
}
