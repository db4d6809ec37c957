//! # CRT Theme
//!
//! Green phosphor palette for the terminal: screen colours, token colours
//! and the faded bezel.

use super::ansi_escape_codes::{bg_rgb, fg_rgb, BOLD, NORMAL_INTENSITY};
use crate::repl::highlight::TokenKind;
use crate::repl::models::LineStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn fg(self) -> String {
        fg_rgb(self.0, self.1, self.2)
    }

    pub fn bg(self) -> String {
        bg_rgb(self.0, self.1, self.2)
    }
}

/// A foreground colour plus weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Rgb,
    pub bold: bool,
}

impl TextStyle {
    const fn plain(color: Rgb) -> Self {
        Self { color, bold: false }
    }

    const fn bold(color: Rgb) -> Self {
        Self { color, bold: true }
    }

    /// Escape sequence selecting this style (background untouched)
    pub fn escape(self) -> String {
        let weight = if self.bold { BOLD } else { NORMAL_INTENSITY };
        format!("{}{}", weight, self.color.fg())
    }
}

pub const SCREEN_BG: Rgb = Rgb(24, 42, 24);
pub const SCANLINE_BG: Rgb = Rgb(20, 36, 20);
pub const TEXT: Rgb = Rgb(0, 255, 0);
pub const PROMPT: Rgb = Rgb(100, 200, 100);
pub const ERROR: Rgb = Rgb(255, 100, 100);
pub const SYSTEM: Rgb = Rgb(200, 200, 100);
pub const CODE: Rgb = Rgb(150, 220, 220);

pub const KEYWORD: Rgb = Rgb(86, 156, 214);
pub const STRING: Rgb = Rgb(206, 145, 120);
pub const COMMENT: Rgb = Rgb(106, 153, 85);
pub const NUMBER: Rgb = Rgb(181, 206, 168);
pub const JSON_BRACKET: Rgb = Rgb(255, 255, 255);

pub const BEZEL_OUTER: Rgb = Rgb(27, 48, 27);
pub const BEZEL_INNER: Rgb = Rgb(36, 64, 36);
pub const BEZEL_STEPS: usize = 6;

pub const STATUS_FG: Rgb = Rgb(0xd4, 0xc4, 0xa0);
pub const STATUS_BG: Rgb = Rgb(0x8a, 0x83, 0x75);

/// Even fade from the outer bezel colour (index 0) to the inner one
pub fn border_fade() -> [Rgb; BEZEL_STEPS] {
    let last = (BEZEL_STEPS - 1) as i32;
    let step = |outer: u8, inner: u8, i: i32| -> u8 {
        (outer as i32 + (inner as i32 - outer as i32) * i / last) as u8
    };
    let mut fade = [BEZEL_OUTER; BEZEL_STEPS];
    for (i, color) in fade.iter_mut().enumerate() {
        let i = i as i32;
        *color = Rgb(
            step(BEZEL_OUTER.0, BEZEL_INNER.0, i),
            step(BEZEL_OUTER.1, BEZEL_INNER.1, i),
            step(BEZEL_OUTER.2, BEZEL_INNER.2, i),
        );
    }
    fade
}

/// Base style for a transcript segment
pub fn line_style(style: LineStyle) -> TextStyle {
    match style {
        LineStyle::Prompt => TextStyle::plain(PROMPT),
        LineStyle::Input | LineStyle::Output | LineStyle::Listing => TextStyle::plain(TEXT),
        LineStyle::Error => TextStyle::plain(ERROR),
        LineStyle::System => TextStyle::plain(SYSTEM),
        LineStyle::Heading => TextStyle::bold(TEXT),
        LineStyle::Code => TextStyle::plain(CODE),
        LineStyle::Emphasis => TextStyle::bold(SYSTEM),
    }
}

/// Style of a token in typed input
pub fn input_token_style(kind: TokenKind) -> TextStyle {
    match kind {
        TokenKind::Keyword => TextStyle::bold(KEYWORD),
        TokenKind::String => TextStyle::plain(STRING),
        TokenKind::Comment => TextStyle::plain(COMMENT),
        TokenKind::Number => TextStyle::plain(NUMBER),
        _ => TextStyle::plain(TEXT),
    }
}

/// Style of a token in JSON output
pub fn json_token_style(kind: TokenKind) -> TextStyle {
    match kind {
        TokenKind::String => TextStyle::plain(STRING),
        TokenKind::Number => TextStyle::plain(NUMBER),
        TokenKind::Keyword => TextStyle::bold(KEYWORD),
        TokenKind::Bracket => TextStyle::bold(JSON_BRACKET),
        _ => TextStyle::plain(TEXT),
    }
}
