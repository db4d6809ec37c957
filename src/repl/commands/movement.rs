//! # Movement Commands
//!
//! Cursor motion within the input line, with the usual readline chords.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Command, CommandContext, CommandEvent, MovementDirection};

fn has_ctrl(event: &KeyEvent) -> bool {
    event.modifiers.contains(KeyModifiers::CONTROL)
}

fn has_alt(event: &KeyEvent) -> bool {
    event.modifiers.contains(KeyModifiers::ALT)
}

/// Move cursor left (Left arrow)
pub struct MoveCursorLeftCommand;

impl Command for MoveCursorLeftCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::Left && !has_ctrl(event) && !has_alt(event)
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::cursor_move(MovementDirection::Left)])
    }

    fn name(&self) -> &'static str {
        "MoveCursorLeft"
    }
}

/// Move cursor right (Right arrow)
pub struct MoveCursorRightCommand;

impl Command for MoveCursorRightCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::Right && !has_ctrl(event) && !has_alt(event)
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::cursor_move(MovementDirection::Right)])
    }

    fn name(&self) -> &'static str {
        "MoveCursorRight"
    }
}

/// Home or Ctrl+A
pub struct MoveToLineStartCommand;

impl Command for MoveToLineStartCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::Home || (event.code == KeyCode::Char('a') && has_ctrl(event))
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::cursor_move(MovementDirection::LineStart)])
    }

    fn name(&self) -> &'static str {
        "MoveToLineStart"
    }
}

/// End or Ctrl+E
pub struct MoveToLineEndCommand;

impl Command for MoveToLineEndCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::End || (event.code == KeyCode::Char('e') && has_ctrl(event))
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::cursor_move(MovementDirection::LineEnd)])
    }

    fn name(&self) -> &'static str {
        "MoveToLineEnd"
    }
}

/// Alt+B or Ctrl+Left
pub struct MoveWordBackwardCommand;

impl Command for MoveWordBackwardCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        (event.code == KeyCode::Char('b') && has_alt(event))
            || (event.code == KeyCode::Left && (has_ctrl(event) || has_alt(event)))
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::cursor_move(MovementDirection::WordBackward)])
    }

    fn name(&self) -> &'static str {
        "MoveWordBackward"
    }
}

/// Alt+F or Ctrl+Right
pub struct MoveWordForwardCommand;

impl Command for MoveWordForwardCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        (event.code == KeyCode::Char('f') && has_alt(event))
            || (event.code == KeyCode::Right && (has_ctrl(event) || has_alt(event)))
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::cursor_move(MovementDirection::WordForward)])
    }

    fn name(&self) -> &'static str {
        "MoveWordForward"
    }
}
