//! # Models Module
//!
//! Plain state owned by the view model: the input line, history, kill
//! buffer and transcript.

pub mod history;
pub mod kill_buffer;
pub mod line_buffer;
pub mod transcript;

pub use history::{History, HistoryStep};
pub use kill_buffer::{KillBuffer, MemoryKillBuffer};
pub use line_buffer::LineBuffer;
pub use transcript::{LineStyle, Segment, Transcript, TranscriptLine, MAX_TRANSCRIPT_LINES};
