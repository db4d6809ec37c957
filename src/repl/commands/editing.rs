//! # Text Editing Commands
//!
//! Insertion, deletion, kill/yank, submission and completion.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Command, CommandContext, CommandEvent, KillScope, MovementDirection};

fn is_ctrl(event: &KeyEvent, ch: char) -> bool {
    event.code == KeyCode::Char(ch) && event.modifiers.contains(KeyModifiers::CONTROL)
}

/// Insert a printable character
pub struct InsertCharCommand;

impl Command for InsertCharCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        match event.code {
            KeyCode::Char(ch) => {
                !event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    && !ch.is_control()
            }
            _ => false,
        }
    }

    fn execute(&self, event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        if let KeyCode::Char(ch) = event.code {
            Ok(vec![CommandEvent::text_insert(ch.to_string())])
        } else {
            Ok(vec![])
        }
    }

    fn name(&self) -> &'static str {
        "InsertChar"
    }
}

/// Delete character before cursor (Backspace)
pub struct DeleteCharCommand;

impl Command for DeleteCharCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        matches!(event.code, KeyCode::Backspace)
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::text_delete(MovementDirection::Left)])
    }

    fn name(&self) -> &'static str {
        "DeleteChar"
    }
}

/// Delete character at cursor (Delete, or Ctrl+D on a non-empty line)
pub struct DeleteCharAtCursorCommand;

impl Command for DeleteCharAtCursorCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        matches!(event.code, KeyCode::Delete)
            || (is_ctrl(event, 'd') && !context.state.line_is_empty())
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::text_delete(MovementDirection::Right)])
    }

    fn name(&self) -> &'static str {
        "DeleteCharAtCursor"
    }
}

/// Kill from the cursor to the end of the line (Ctrl+K)
pub struct KillToLineEndCommand;

impl Command for KillToLineEndCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        is_ctrl(event, 'k')
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::kill(KillScope::ToLineEnd)])
    }

    fn name(&self) -> &'static str {
        "KillToLineEnd"
    }
}

/// Kill the whole line (Ctrl+U)
pub struct KillLineCommand;

impl Command for KillLineCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        is_ctrl(event, 'u')
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::kill(KillScope::WholeLine)])
    }

    fn name(&self) -> &'static str {
        "KillLine"
    }
}

/// Kill the word before the cursor (Ctrl+W)
pub struct KillWordBackwardCommand;

impl Command for KillWordBackwardCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        is_ctrl(event, 'w')
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::kill(KillScope::WordBackward)])
    }

    fn name(&self) -> &'static str {
        "KillWordBackward"
    }
}

/// Insert the last killed text (Ctrl+Y)
pub struct YankCommand;

impl Command for YankCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        is_ctrl(event, 'y')
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::YankRequested])
    }

    fn name(&self) -> &'static str {
        "Yank"
    }
}

/// Submit the line (Enter)
pub struct SubmitCommand;

impl Command for SubmitCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        matches!(event.code, KeyCode::Enter)
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::SubmitRequested])
    }

    fn name(&self) -> &'static str {
        "Submit"
    }
}

/// Tab completion; only meaningful at the calculator prompt
pub struct CompleteCommand;

impl Command for CompleteCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        matches!(event.code, KeyCode::Tab) && context.is_calculator()
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::CompletionRequested])
    }

    fn name(&self) -> &'static str {
        "Complete"
    }
}
