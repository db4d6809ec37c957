//! History recall with Up/Down.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use super::{Command, CommandContext, CommandEvent, HistoryDirection};

pub struct HistoryPreviousCommand;

impl Command for HistoryPreviousCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::Up && context.is_calculator()
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::history(HistoryDirection::Previous)])
    }

    fn name(&self) -> &'static str {
        "HistoryPrevious"
    }
}

pub struct HistoryNextCommand;

impl Command for HistoryNextCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::Down && context.is_calculator()
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::history(HistoryDirection::Next)])
    }

    fn name(&self) -> &'static str {
        "HistoryNext"
    }
}
