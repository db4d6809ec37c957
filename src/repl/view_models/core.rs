//! # Core ViewModel
//!
//! Owns all front-end state and the operations the controller applies to
//! it. Nothing here talks to the engine or the terminal.

use crate::repl::commands::{HistoryDirection, KillScope, MovementDirection};
use crate::repl::completion::{format_columns, Completer};
use crate::repl::models::{
    History, HistoryStep, KillBuffer, LineBuffer, LineStyle, MemoryKillBuffer, Segment,
    Transcript,
};

pub const PROMPT: &str = ">>> ";

/// What Enter means right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Lines go to the engine
    Calculator,
    /// Lines answer the "download pyco.py?" question
    DownloadPrompt,
}

/// Outcome of submitting the input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing to send; a fresh prompt was shown
    Blank,
    /// Send this line to the engine
    Line(String),
    /// Answer to the download question
    Answer(String),
}

/// Outcome of a Tab press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    NoMatch,
    /// Text was inserted (possibly nothing, when the common prefix is
    /// already typed)
    Inserted(String),
    /// Several candidates were listed in the transcript
    Listed(Vec<String>),
}

pub struct ViewModel {
    line: LineBuffer,
    history: History,
    kill_buffer: Box<dyn KillBuffer>,
    transcript: Transcript,
    completer: Completer,
    input_mode: InputMode,
    terminal_size: (u16, u16),
}

impl ViewModel {
    pub fn new() -> Self {
        Self::with_kill_buffer(Box::new(MemoryKillBuffer::new()))
    }

    pub fn with_kill_buffer(kill_buffer: Box<dyn KillBuffer>) -> Self {
        Self {
            line: LineBuffer::new(),
            history: History::new(),
            kill_buffer,
            transcript: Transcript::new(),
            completer: Completer::new(),
            input_mode: InputMode::Calculator,
            terminal_size: (80, 24),
        }
    }

    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        tracing::debug!("Input mode {:?} -> {:?}", self.input_mode, mode);
        self.input_mode = mode;
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    pub fn update_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    /// Prompt drawn before the input line.
    ///
    /// Empty while an open question (download prompt, engine `input()`)
    /// sits on the current row.
    pub fn prompt(&self) -> &'static str {
        if self.input_mode == InputMode::DownloadPrompt || self.transcript.open_line().is_some() {
            ""
        } else {
            PROMPT
        }
    }

    pub fn insert_text(&mut self, text: &str) {
        self.line.insert_str(text);
    }

    pub fn delete(&mut self, direction: MovementDirection) {
        match direction {
            MovementDirection::Left => {
                self.line.delete_before();
            }
            MovementDirection::Right => {
                self.line.delete_at();
            }
            other => tracing::warn!("Unsupported delete direction: {:?}", other),
        }
    }

    pub fn move_cursor(&mut self, direction: MovementDirection) {
        match direction {
            MovementDirection::Left => self.line.move_left(),
            MovementDirection::Right => self.line.move_right(),
            MovementDirection::LineStart => self.line.move_home(),
            MovementDirection::LineEnd => self.line.move_end(),
            MovementDirection::WordBackward => self.line.move_word_left(),
            MovementDirection::WordForward => self.line.move_word_right(),
        }
    }

    pub fn kill(&mut self, scope: KillScope) {
        let killed = match scope {
            KillScope::ToLineEnd => self.line.kill_to_end(),
            KillScope::WholeLine => self.line.kill_line(),
            KillScope::WordBackward => self.line.kill_word_before(),
        };
        self.kill_buffer.kill(killed);
    }

    pub fn yank(&mut self) {
        if let Some(text) = self.kill_buffer.yank().map(str::to_string) {
            self.line.insert_str(&text);
        }
    }

    pub fn navigate_history(&mut self, direction: HistoryDirection) {
        let step = match direction {
            HistoryDirection::Previous => self.history.previous(),
            HistoryDirection::Next => self.history.next(),
        };
        match step {
            HistoryStep::Entry(entry) => self.line.set_text(&entry),
            HistoryStep::Cleared => self.line.clear(),
            HistoryStep::Unchanged => {}
        }
    }

    /// Take the input line, echo it into the transcript and say what to do
    /// with it
    pub fn submit(&mut self) -> Submission {
        let prompt = self.prompt();
        let answering_engine = self.transcript.open_line().is_some();
        let text = self.line.take();
        self.transcript.push_input(prompt, &text);

        if self.input_mode == InputMode::DownloadPrompt {
            return Submission::Answer(text);
        }
        if text.trim().is_empty() {
            // An engine `input()` still wants the empty answer
            return if answering_engine {
                Submission::Line(text)
            } else {
                Submission::Blank
            };
        }

        self.history.push(&text);
        self.completer.learn(&text);
        Submission::Line(text)
    }

    /// Complete the word before the cursor; `width` is the listing width
    pub fn complete(&mut self, width: usize) -> CompletionOutcome {
        let Some(completion) = self.completer.complete(&self.line.before_cursor()) else {
            return CompletionOutcome::NoMatch;
        };

        let insertion = completion.insertion();
        self.line.insert_str(&insertion);
        if completion.is_unique() {
            return CompletionOutcome::Inserted(insertion);
        }

        // Echo the partial line, list candidates, keep editing below them
        self.transcript.push_input(self.prompt(), &self.line.text());
        for row in format_columns(&completion.candidates, width) {
            self.transcript.push_line(LineStyle::Listing, &row);
        }
        CompletionOutcome::Listed(completion.candidates)
    }

    /// Ctrl+C with nothing running: abandon the line
    pub fn interrupt_line(&mut self) {
        let text = self.line.take();
        self.transcript.push_input(self.prompt(), &text);
        self.transcript.push_line(LineStyle::Error, "KeyboardInterrupt");
    }

    pub fn clear_line(&mut self) {
        self.line.clear();
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Append engine output as it arrives
    pub fn append_output(&mut self, style: LineStyle, text: &str) {
        self.transcript.append(style, text);
    }

    /// Append a message on its own lines; a message ending without a
    /// newline stays open as a question
    pub fn system_message(&mut self, text: &str) {
        self.transcript.finish_line();
        self.transcript.append(LineStyle::System, text);
    }

    /// Append pre-styled rows such as a rendered README
    pub fn styled_message(&mut self, rows: &[Vec<Segment>]) {
        for row in rows {
            self.transcript.push_segments(row);
        }
    }

    pub fn error_message(&mut self, text: &str) {
        self.transcript.push_line(LineStyle::Error, text);
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new()
    }
}
