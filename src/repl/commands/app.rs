//! # Application Control Commands
//!
//! Interrupt, quit, clear, README and engine update.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Command, CommandContext, CommandEvent};

fn is_ctrl(event: &KeyEvent, ch: char) -> bool {
    event.code == KeyCode::Char(ch) && event.modifiers.contains(KeyModifiers::CONTROL)
}

/// Keyboard interrupt (Ctrl+C)
pub struct InterruptCommand;

impl Command for InterruptCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        is_ctrl(event, 'c')
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::InterruptRequested])
    }

    fn name(&self) -> &'static str {
        "Interrupt"
    }
}

/// Quit (Ctrl+Q, or Ctrl+D on an empty line)
pub struct QuitCommand;

impl Command for QuitCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        is_ctrl(event, 'q') || (is_ctrl(event, 'd') && context.state.line_is_empty())
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::QuitRequested])
    }

    fn name(&self) -> &'static str {
        "Quit"
    }
}

/// Clear the transcript (Ctrl+L)
pub struct ClearScreenCommand;

impl Command for ClearScreenCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        is_ctrl(event, 'l')
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::ClearScreenRequested])
    }

    fn name(&self) -> &'static str {
        "ClearScreen"
    }
}

/// Show the engine README (F1)
pub struct ShowReadmeCommand;

impl Command for ShowReadmeCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::F(1)
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::ShowReadmeRequested])
    }

    fn name(&self) -> &'static str {
        "ShowReadme"
    }
}

/// Download the engine again (F2)
pub struct UpdateEngineCommand;

impl Command for UpdateEngineCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::F(2)
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::UpdateEngineRequested])
    }

    fn name(&self) -> &'static str {
        "UpdateEngine"
    }
}

pub struct ShowAboutCommand;

impl Command for ShowAboutCommand {
    fn is_relevant(&self, _context: &CommandContext, event: &KeyEvent) -> bool {
        event.code == KeyCode::F(3)
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::ShowAboutRequested])
    }

    fn name(&self) -> &'static str {
        "ShowAbout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::commands::test_support::*;
    use crate::repl::view_models::InputMode;

    #[test]
    fn interrupt_should_be_relevant_for_ctrl_c_only() {
        let context = context("", InputMode::Calculator);
        assert!(InterruptCommand.is_relevant(&context, &ctrl('c')));
        assert!(!InterruptCommand.is_relevant(&context, &key(KeyCode::Char('c'))));
        assert!(!InterruptCommand.is_relevant(&context, &ctrl('x')));
    }

    #[test]
    fn ctrl_d_quits_only_on_an_empty_line() {
        assert!(QuitCommand.is_relevant(&context("", InputMode::Calculator), &ctrl('d')));
        assert!(!QuitCommand.is_relevant(&context("1+", InputMode::Calculator), &ctrl('d')));
        assert!(QuitCommand.is_relevant(&context("1+", InputMode::Calculator), &ctrl('q')));
    }

    #[test]
    fn quit_should_produce_quit_event() {
        let events = QuitCommand
            .execute(ctrl('q'), &context("", InputMode::Calculator))
            .unwrap();
        assert_eq!(events, vec![CommandEvent::QuitRequested]);
    }
}
