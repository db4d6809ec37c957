//! crossterm streams for the real terminal.
//!
//! A render pass repaints every row of the CRT screen, so output is collected
//! in a buffer and reaches the terminal in one write when the renderer flushes.

use super::{EventStream, RenderStream, TerminalSize};
use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

/// Screen repaints are a few kilobytes of escapes
const RENDER_BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Default)]
pub struct TerminalEventStream;

impl TerminalEventStream {
    pub fn new() -> Self {
        Self
    }
}

impl EventStream for TerminalEventStream {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(event::read()?)
    }
}

/// Buffered stdout; cursor moves are queued with the row text
pub struct TerminalRenderStream {
    out: BufWriter<Stdout>,
}

impl TerminalRenderStream {
    pub fn new() -> Self {
        Self {
            out: BufWriter::with_capacity(RENDER_BUFFER_CAPACITY, io::stdout()),
        }
    }
}

impl Default for TerminalRenderStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for TerminalRenderStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl RenderStream for TerminalRenderStream {
    fn clear_screen(&mut self) -> Result<()> {
        queue!(self.out, Clear(ClearType::All))?;
        Ok(())
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        queue!(self.out, cursor::MoveTo(x, y))?;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        queue!(self.out, cursor::Hide)?;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        queue!(self.out, cursor::Show)?;
        Ok(())
    }

    fn get_size(&self) -> Result<TerminalSize> {
        Ok(terminal::size()?)
    }

    // Screen switches are flushed at once rather than waiting for the next
    // render.

    fn enter_alternate_screen(&mut self) -> Result<()> {
        execute!(self.out, EnterAlternateScreen)?;
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        execute!(self.out, LeaveAlternateScreen)?;
        Ok(())
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        Ok(())
    }
}
