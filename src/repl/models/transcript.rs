//! # Transcript Model
//!
//! Everything above the live input line: echoed input, engine output,
//! errors, system messages and completion listings.
//!
//! The last line may be left open (not newline-terminated), which is how a
//! question such as the download prompt or an engine `input()` prompt stays
//! on the same row as the text the user types next.

use std::collections::VecDeque;

/// Oldest lines are dropped past this many
pub const MAX_TRANSCRIPT_LINES: usize = 5000;

const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Prompt,
    /// User input; highlighted as Python when rendered
    Input,
    /// Engine stdout; highlighted as JSON when the line parses as JSON
    Output,
    Error,
    System,
    /// Completion candidates
    Listing,
    /// README headings
    Heading,
    /// Code in the README, fenced or inline
    Code,
    Emphasis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub style: LineStyle,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptLine {
    segments: Vec<Segment>,
}

impl TranscriptLine {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn push(&mut self, style: LineStyle, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.segments.push(Segment {
                style,
                text: text.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: VecDeque<TranscriptLine>,
    open: Option<TranscriptLine>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of output; newlines close lines, a trailing fragment
    /// stays open.
    pub fn append(&mut self, style: LineStyle, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\t', &" ".repeat(TAB_WIDTH));
        let mut pieces = text.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            let piece = piece.trim_end_matches('\r');
            if !piece.is_empty() {
                self.open.get_or_insert_with(TranscriptLine::default).push(style, piece);
            }
            if pieces.peek().is_some() {
                self.close_open_line();
            }
        }
    }

    /// Append complete lines, starting on a fresh row
    pub fn push_line(&mut self, style: LineStyle, text: &str) {
        self.finish_line();
        self.append(style, text);
        self.close_open_line();
    }

    /// Append one complete row made of styled segments
    pub fn push_segments(&mut self, segments: &[Segment]) {
        self.finish_line();
        for segment in segments {
            self.append(segment.style, &segment.text);
        }
        self.close_open_line();
    }

    /// Echo a submitted input line after its prompt (or after the open
    /// question it answers)
    pub fn push_input(&mut self, prompt: &str, input: &str) {
        self.append(LineStyle::Prompt, prompt);
        self.append(LineStyle::Input, input);
        self.close_open_line();
    }

    /// Close the open line, if any
    pub fn finish_line(&mut self) {
        if self.open.is_some() {
            self.close_open_line();
        }
    }

    fn close_open_line(&mut self) {
        let line = self.open.take().unwrap_or_default();
        self.lines.push_back(line);
        while self.lines.len() > MAX_TRANSCRIPT_LINES {
            self.lines.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.open = None;
    }

    /// Closed lines, oldest first
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &TranscriptLine> {
        self.lines.iter()
    }

    pub fn open_line(&self) -> Option<&TranscriptLine> {
        self.open.as_ref()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.open.is_none()
    }

    /// Plain text of every line including the open one, joined with newlines
    pub fn plain_text(&self) -> String {
        let mut out: Vec<String> = self.lines.iter().map(TranscriptLine::text).collect();
        if let Some(open) = &self.open {
            out.push(open.text());
        }
        out.join("\n")
    }
}
