//! # Command Pattern
//!
//! Each key binding is a small stateless `Command`. The registry asks every
//! command in order whether it is relevant to a key event and runs the
//! first one that is; the resulting `CommandEvent`s are applied by the
//! controller.

use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod app;
pub mod context;
pub mod editing;
pub mod events;
pub mod history;
pub mod movement;

pub use app::*;
pub use context::{CommandContext, ViewModelSnapshot};
pub use editing::*;
pub use events::{CommandEvent, HistoryDirection, KillScope, MovementDirection};
pub use history::*;
pub use movement::*;

pub trait Command: Send + Sync {
    /// Whether this command handles `event` in the given state
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool;

    fn execute(&self, event: KeyEvent, context: &CommandContext) -> Result<Vec<CommandEvent>>;

    /// Name for logging
    fn name(&self) -> &'static str;
}

type CommandCollection = Vec<Box<dyn Command>>;

/// Ordered set of commands; the first relevant one wins
pub struct CommandRegistry {
    commands: CommandCollection,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            commands: Vec::new(),
        };
        registry.register_default_commands();
        registry
    }

    fn register_default_commands(&mut self) {
        // Application control
        self.add_command(Box::new(InterruptCommand));
        self.add_command(Box::new(QuitCommand));
        self.add_command(Box::new(ClearScreenCommand));
        self.add_command(Box::new(ShowReadmeCommand));
        self.add_command(Box::new(UpdateEngineCommand));
        self.add_command(Box::new(ShowAboutCommand));

        // Line submission and completion
        self.add_command(Box::new(SubmitCommand));
        self.add_command(Box::new(CompleteCommand));

        // History
        self.add_command(Box::new(HistoryPreviousCommand));
        self.add_command(Box::new(HistoryNextCommand));

        // Movement
        self.add_command(Box::new(MoveCursorLeftCommand));
        self.add_command(Box::new(MoveCursorRightCommand));
        self.add_command(Box::new(MoveToLineStartCommand));
        self.add_command(Box::new(MoveToLineEndCommand));
        self.add_command(Box::new(MoveWordBackwardCommand));
        self.add_command(Box::new(MoveWordForwardCommand));

        // Editing
        self.add_command(Box::new(DeleteCharCommand));
        self.add_command(Box::new(DeleteCharAtCursorCommand));
        self.add_command(Box::new(KillToLineEndCommand));
        self.add_command(Box::new(KillLineCommand));
        self.add_command(Box::new(KillWordBackwardCommand));
        self.add_command(Box::new(YankCommand));
        self.add_command(Box::new(InsertCharCommand));
    }

    pub fn add_command(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    /// Run the first relevant command; no match yields no events
    pub fn process_event(
        &self,
        event: KeyEvent,
        context: &CommandContext,
    ) -> Result<Vec<CommandEvent>> {
        for command in &self.commands {
            if command.is_relevant(context, &event) {
                tracing::debug!("Key {:?} handled by {}", event.code, command.name());
                return command.execute(event, context);
            }
        }
        tracing::debug!("No command for key {:?}", event);
        Ok(vec![])
    }

    pub fn commands(&self) -> &CommandCollection {
        &self.commands
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
