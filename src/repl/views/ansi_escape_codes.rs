//! ANSI escape code constants for terminal styling

// ============================================================================
// TEXT ATTRIBUTES
// ============================================================================

pub const RESET: &str = "\x1b[0m"; // Reset all attributes
pub const BOLD: &str = "\x1b[1m"; // Bold text
pub const NORMAL_INTENSITY: &str = "\x1b[22m"; // Bold/dim off

// ============================================================================
// CURSOR CONTROL
// ============================================================================

pub const CURSOR_BLOCK: &str = "\x1b[2 q"; // Blinking block cursor
pub const CURSOR_DEFAULT: &str = "\x1b[0 q"; // Terminal's own cursor shape

// ============================================================================
// LINE CONTROL
// ============================================================================

pub const CLEAR_LINE: &str = "\x1b[K"; // Clear from cursor to end of line

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Create an RGB foreground escape code (24-bit color)
pub fn fg_rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{r};{g};{b}m")
}

/// Create an RGB background escape code (24-bit color)
pub fn bg_rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[48;2;{r};{g};{b}m")
}

/// Remove every CSI escape sequence from `text`
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // Parameters and intermediates, then one final byte in @..~
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_helpers_emit_truecolor_sequences() {
        assert_eq!(fg_rgb(0, 255, 0), "\x1b[38;2;0;255;0m");
        assert_eq!(bg_rgb(24, 42, 24), "\x1b[48;2;24;42;24m");
    }

    #[test]
    fn strip_ansi_keeps_only_text() {
        let styled = format!("{}{BOLD}>>> {RESET}1+1{CLEAR_LINE}{CURSOR_BLOCK}", fg_rgb(1, 2, 3));
        assert_eq!(strip_ansi(&styled), ">>> 1+1");
    }
}
