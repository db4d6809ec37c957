//! # Views Module
//!
//! Rendering of the CRT screen.

pub mod ansi_escape_codes;
pub mod terminal_renderer;
pub mod theme;

pub use terminal_renderer::{TerminalRenderer, ViewRenderer};
