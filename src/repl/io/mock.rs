//! # Mock I/O Implementations for Testing
//!
//! Provides mock implementations of EventStream and RenderStream traits
//! for testing without terminal dependencies.
//!
//! `MockRenderStream` shares its state through an `Arc`, so a test can keep
//! a handle while the controller owns the stream.

use super::{EventStream, RenderStream, TerminalSize};
use crate::repl::views::ansi_escape_codes::strip_ansi;
use anyhow::Result;
use crossterm::event::Event;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Mock event stream for testing
///
/// Provides pre-programmed events; `poll` reports false once they run out.
#[derive(Default)]
pub struct MockEventStream {
    events: VecDeque<Event>,
}

impl MockEventStream {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventStream for MockEventStream {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No events available"))
    }
}

/// Recorded render command for verification
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    ClearScreen,
    MoveCursor(u16, u16),
    HideCursor,
    ShowCursor,
    GetSize,
    EnterAlternateScreen,
    LeaveAlternateScreen,
    EnableRawMode,
    DisableRawMode,
    Write(Vec<u8>),
    Flush,
}

/// Plain-text picture of what the terminal shows
#[derive(Debug, Clone)]
pub struct ScreenSnapshot {
    rows: Vec<Vec<char>>,
    cursor: (u16, u16),
    cursor_visible: bool,
}

impl ScreenSnapshot {
    fn blank(size: TerminalSize) -> Self {
        Self {
            rows: vec![vec![' '; size.0 as usize]; size.1 as usize],
            cursor: (0, 0),
            cursor_visible: true,
        }
    }

    fn put_text(&mut self, text: &str) {
        for ch in strip_ansi(text).chars() {
            let (x, y) = self.cursor;
            if let Some(cell) = self
                .rows
                .get_mut(y as usize)
                .and_then(|row| row.get_mut(x as usize))
            {
                *cell = ch;
            }
            self.cursor.0 = x.saturating_add(1);
        }
    }

    fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(' ');
        }
    }

    pub fn row_text(&self, y: u16) -> String {
        self.rows
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    /// All rows joined with newlines
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.rows
            .iter()
            .any(|row| row.iter().collect::<String>().contains(needle))
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }
}

#[derive(Debug)]
struct MockState {
    commands: Vec<RenderCommand>,
    written: Vec<u8>,
    screen: ScreenSnapshot,
    raw_mode: bool,
    alternate_screen: bool,
}

/// Mock render stream for testing
///
/// Records all rendering commands and keeps a virtual screen.
#[derive(Clone)]
pub struct MockRenderStream {
    state: Arc<Mutex<MockState>>,
    terminal_size: TerminalSize,
}

impl MockRenderStream {
    pub fn new() -> Self {
        Self::with_size((80, 24))
    }

    pub fn with_size(size: TerminalSize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                commands: Vec::new(),
                written: Vec::new(),
                screen: ScreenSnapshot::blank(size),
                raw_mode: false,
                alternate_screen: false,
            })),
            terminal_size: size,
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, command: RenderCommand) {
        self.state().commands.push(command);
    }

    pub fn get_commands(&self) -> Vec<RenderCommand> {
        self.state().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state().commands.clear();
    }

    pub fn has_command(&self, command: &RenderCommand) -> bool {
        self.state().commands.contains(command)
    }

    /// Everything written so far, escape sequences included
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.state().written).to_string()
    }

    pub fn screen(&self) -> ScreenSnapshot {
        self.state().screen.clone()
    }

    pub fn is_raw_mode(&self) -> bool {
        self.state().raw_mode
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.state().alternate_screen
    }
}

impl Write for MockRenderStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state();
        state.written.extend_from_slice(buf);
        state.screen.put_text(&String::from_utf8_lossy(buf));
        state.commands.push(RenderCommand::Write(buf.to_vec()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.record(RenderCommand::Flush);
        Ok(())
    }
}

impl RenderStream for MockRenderStream {
    fn clear_screen(&mut self) -> Result<()> {
        let mut state = self.state();
        state.commands.push(RenderCommand::ClearScreen);
        state.screen.clear();
        Ok(())
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        let mut state = self.state();
        state.commands.push(RenderCommand::MoveCursor(x, y));
        state.screen.cursor = (x, y);
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        let mut state = self.state();
        state.commands.push(RenderCommand::HideCursor);
        state.screen.cursor_visible = false;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        let mut state = self.state();
        state.commands.push(RenderCommand::ShowCursor);
        state.screen.cursor_visible = true;
        Ok(())
    }

    fn get_size(&self) -> Result<TerminalSize> {
        self.record(RenderCommand::GetSize);
        Ok(self.terminal_size)
    }

    fn enter_alternate_screen(&mut self) -> Result<()> {
        let mut state = self.state();
        state.commands.push(RenderCommand::EnterAlternateScreen);
        state.alternate_screen = true;
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        let mut state = self.state();
        state.commands.push(RenderCommand::LeaveAlternateScreen);
        state.alternate_screen = false;
        Ok(())
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        let mut state = self.state();
        state.commands.push(RenderCommand::EnableRawMode);
        state.raw_mode = true;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        let mut state = self.state();
        state.commands.push(RenderCommand::DisableRawMode);
        state.raw_mode = false;
        Ok(())
    }
}

impl Default for MockRenderStream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn mock_event_stream_should_provide_events_in_order() {
        let mut stream = MockEventStream::new(vec![
            Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::empty())),
            Event::Key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::empty())),
        ]);

        assert!(stream.poll(Duration::from_millis(0)).unwrap());
        match stream.read().unwrap() {
            Event::Key(key) => assert_eq!(key.code, KeyCode::Char('a')),
            other => panic!("Expected key event, got {other:?}"),
        }
        stream.read().unwrap();

        assert!(!stream.poll(Duration::from_millis(0)).unwrap());
        assert!(stream.read().is_err());
    }

    #[test]
    fn mock_render_stream_should_place_text_at_cursor() {
        let mut stream = MockRenderStream::with_size((10, 3));
        stream.move_cursor(2, 1).unwrap();
        stream.write_all(b"\x1b[1mhi\x1b[0m").unwrap();

        let screen = stream.screen();
        assert_eq!(screen.row_text(1), "  hi      ");
        assert_eq!(screen.cursor(), (4, 1));
    }

    #[test]
    fn clones_share_recorded_state() {
        let mut stream = MockRenderStream::new();
        let handle = stream.clone();
        stream.enable_raw_mode().unwrap();
        stream.clear_screen().unwrap();

        assert!(handle.is_raw_mode());
        assert!(handle.has_command(&RenderCommand::ClearScreen));
    }
}
