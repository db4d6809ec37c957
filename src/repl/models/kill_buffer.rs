//! # Kill Buffer
//!
//! Holds the most recently killed text (Ctrl+K, Ctrl+U, Ctrl+W) for Ctrl+Y.

/// Trait for kill buffer implementations
pub trait KillBuffer: Send {
    /// Store killed text, replacing any previous kill
    fn kill(&mut self, text: String);

    /// The text Ctrl+Y would insert
    fn yank(&self) -> Option<&str>;

    fn clear(&mut self);

    fn has_content(&self) -> bool {
        self.yank().is_some()
    }
}

/// Memory-based kill buffer
#[derive(Debug, Default)]
pub struct MemoryKillBuffer {
    content: Option<String>,
}

impl MemoryKillBuffer {
    pub fn new() -> Self {
        Self { content: None }
    }
}

impl KillBuffer for MemoryKillBuffer {
    fn kill(&mut self, text: String) {
        // Killing nothing keeps the previous kill, like readline
        if text.is_empty() {
            return;
        }
        tracing::debug!("Killed {} characters into memory buffer", text.chars().count());
        self.content = Some(text);
    }

    fn yank(&self) -> Option<&str> {
        self.content.as_deref()
    }

    fn clear(&mut self) {
        self.content = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_kill_buffer_should_store_and_yank() {
        let mut buffer = MemoryKillBuffer::new();
        assert!(!buffer.has_content());

        buffer.kill("math.sqrt".to_string());
        assert_eq!(buffer.yank(), Some("math.sqrt"));

        buffer.kill("pi".to_string());
        assert_eq!(buffer.yank(), Some("pi"));
    }

    #[test]
    fn empty_kill_keeps_previous_text() {
        let mut buffer = MemoryKillBuffer::new();
        buffer.kill("42".to_string());
        buffer.kill(String::new());
        assert_eq!(buffer.yank(), Some("42"));

        buffer.clear();
        assert!(!buffer.has_content());
    }
}
