//! # Input Line Buffer
//!
//! The single editable line behind the prompt. Positions are char indices,
//! never byte offsets, so multi-byte input behaves like everything else.

/// Characters that belong to a word for word motion and Ctrl+W
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Text left of the cursor
    pub fn before_cursor(&self) -> String {
        self.chars[..self.cursor].iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.chars.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    /// Backspace; false at the start of the line
    pub fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Delete; false at the end of the line
    pub fn delete_at(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Start of the word before the cursor (skips separators first)
    fn previous_word_start(&self) -> usize {
        let mut pos = self.cursor;
        while pos > 0 && !is_word_char(self.chars[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && is_word_char(self.chars[pos - 1]) {
            pos -= 1;
        }
        pos
    }

    /// End of the word after the cursor (skips separators first)
    fn next_word_end(&self) -> usize {
        let len = self.chars.len();
        let mut pos = self.cursor;
        while pos < len && !is_word_char(self.chars[pos]) {
            pos += 1;
        }
        while pos < len && is_word_char(self.chars[pos]) {
            pos += 1;
        }
        pos
    }

    pub fn move_word_left(&mut self) {
        self.cursor = self.previous_word_start();
    }

    pub fn move_word_right(&mut self) {
        self.cursor = self.next_word_end();
    }

    /// Remove and return everything from the cursor to the end
    pub fn kill_to_end(&mut self) -> String {
        self.chars.drain(self.cursor..).collect()
    }

    /// Remove and return the whole line
    pub fn kill_line(&mut self) -> String {
        self.cursor = 0;
        self.chars.drain(..).collect()
    }

    /// Remove and return the word before the cursor
    pub fn kill_word_before(&mut self) -> String {
        let start = self.previous_word_start();
        let killed: String = self.chars.drain(start..self.cursor).collect();
        self.cursor = start;
        killed
    }

    /// Replace the contents and put the cursor at the end
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Take the contents, leaving the buffer empty
    pub fn take(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }
}
