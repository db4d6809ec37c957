//! # Syntax Highlighting
//!
//! Single-pass lexers that turn a line into contiguous spans. Span offsets
//! are char indices. Nothing here validates Python; the lexer only colours
//! what it recognises and leaves the rest as plain text.

/// Python keywords, highlighted bold
pub const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
    "or", "pass", "raise", "return", "try", "while", "with", "yield", "True", "False", "None",
    "async", "await",
];

const OPERATORS: &str = "+-*/%=<>!&|^~@:,.;";
const BRACKETS: &str = "()[]{}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    String,
    Comment,
    Number,
    Operator,
    Bracket,
    Identifier,
    Whitespace,
    /// Anything the lexer does not recognise
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl HighlightSpan {
    fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        Self { start, end, kind }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Scan a quoted string starting at `start`; returns the end index
/// (past the closing quote, or the end of the line when unterminated)
fn scan_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Scan `\d+(\.\d+)?([eE][+-]?\d+)?` at `start`
fn scan_number(chars: &[char], start: usize) -> usize {
    let digits = |mut i: usize| {
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = digits(start);
    if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
        i = digits(i + 1);
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            i = digits(j);
        }
    }
    i
}

/// Highlight one line of Python input
pub fn highlight_input(line: &str) -> Vec<HighlightSpan> {
    let chars: Vec<char> = line.chars().collect();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let start = i;
        let kind = if ch.is_whitespace() {
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            TokenKind::Whitespace
        } else if ch == '#' {
            i = chars.len();
            TokenKind::Comment
        } else if ch == '\'' || ch == '"' {
            i = scan_string(&chars, start).min(chars.len());
            TokenKind::String
        } else if ch.is_ascii_digit() {
            i = scan_number(&chars, start);
            // `1abc` is not a number followed by a name
            if i < chars.len() && is_ident_char(chars[i]) {
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                TokenKind::Text
            } else {
                TokenKind::Number
            }
        } else if is_ident_start(ch) {
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if KEYWORDS.contains(&word.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        } else if OPERATORS.contains(ch) {
            i += 1;
            TokenKind::Operator
        } else if BRACKETS.contains(ch) {
            i += 1;
            TokenKind::Bracket
        } else {
            i += 1;
            TokenKind::Text
        };
        push_span(&mut spans, start, i, kind);
    }

    spans
}

/// Merge runs of the same kind so spans stay minimal
fn push_span(spans: &mut Vec<HighlightSpan>, start: usize, end: usize, kind: TokenKind) {
    if let Some(last) = spans.last_mut() {
        if last.kind == kind && last.end == start && kind != TokenKind::Operator {
            last.end = end;
            return;
        }
    }
    spans.push(HighlightSpan::new(start, end, kind));
}

/// Highlight a line of output that parses as JSON; `None` otherwise
pub fn highlight_json(line: &str) -> Option<Vec<HighlightSpan>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || serde_json::from_str::<serde_json::Value>(trimmed).is_err() {
        return None;
    }

    let chars: Vec<char> = line.chars().collect();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let start = i;
        let kind = if ch == '"' {
            i = scan_string(&chars, start).min(chars.len());
            TokenKind::String
        } else if ch == '-' || ch.is_ascii_digit() {
            i += 1;
            i = scan_number(&chars, i);
            TokenKind::Number
        } else if ch.is_ascii_alphabetic() {
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            TokenKind::Keyword
        } else if "{}[]".contains(ch) {
            i += 1;
            TokenKind::Bracket
        } else if ch.is_whitespace() {
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            TokenKind::Whitespace
        } else {
            i += 1;
            TokenKind::Text
        };
        push_span(&mut spans, start, i, kind);
    }
    Some(spans)
}
