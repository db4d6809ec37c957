//! # Terminal Seams
//!
//! The controller never touches crossterm directly. Keys come in through an
//! [`EventStream`] and every byte of the CRT screen goes out through a
//! [`RenderStream`], so a whole pyco session can run against scripted keys
//! and be checked on a [`ScreenSnapshot`].
//!
//! ```text
//! terminal:  AppController ◀── TerminalEventStream  (crossterm poll/read)
//!                          ──▶ TerminalRenderStream (crossterm::queue!)
//!
//! tests:     AppController ◀── MockEventStream      (queued key events)
//!                          ──▶ MockRenderStream     (ScreenSnapshot)
//! ```

use anyhow::Result;
use crossterm::event::Event;
use std::io::Write;
use std::time::Duration;

pub mod mock;
pub mod terminal;

pub use terminal::{TerminalEventStream, TerminalRenderStream};

pub use mock::{MockEventStream, MockRenderStream, RenderCommand, ScreenSnapshot};

/// (columns, rows)
pub type TerminalSize = (u16, u16);

/// Source of key and resize events
///
/// The event loop polls with a short timeout so engine output can be drained
/// between keystrokes.
pub trait EventStream: Send {
    /// Whether an event arrives within `timeout`
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Next event; only called after `poll` returned true
    fn read(&mut self) -> Result<Event>;
}

/// Sink for the rendered screen
///
/// Row text (colours included) is written through `Write`; cursor and
/// terminal-mode changes go through the methods below.
pub trait RenderStream: Write + Send {
    fn clear_screen(&mut self) -> Result<()>;

    /// Zero-based column and row
    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()>;

    fn hide_cursor(&mut self) -> Result<()>;

    fn show_cursor(&mut self) -> Result<()>;

    /// Columns and rows
    fn get_size(&self) -> Result<TerminalSize>;

    fn enter_alternate_screen(&mut self) -> Result<()>;

    fn leave_alternate_screen(&mut self) -> Result<()>;

    /// Raw mode delivers Ctrl+C and Ctrl+D as key events
    fn enable_raw_mode(&mut self) -> Result<()>;

    fn disable_raw_mode(&mut self) -> Result<()>;
}
