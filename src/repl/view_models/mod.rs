//! # View Models
//!
//! State the renderer draws and the commands act upon.

pub mod core;

pub use self::core::{CompletionOutcome, InputMode, Submission, ViewModel, PROMPT};
