//! Command history with a navigation cursor.

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    /// `entries.len()` means "past the newest entry"
    index: usize,
}

/// Result of stepping through history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStep {
    /// Show this entry
    Entry(String),
    /// Walked past the newest entry; the line should be cleared
    Cleared,
    /// Nothing to do
    Unchanged,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line and reset the cursor to the end.
    ///
    /// A repeat of the newest entry is not recorded again.
    pub fn push(&mut self, line: &str) {
        if self.entries.last().map(String::as_str) != Some(line) {
            self.entries.push(line.to_string());
        }
        self.index = self.entries.len();
    }

    pub fn previous(&mut self) -> HistoryStep {
        if self.entries.is_empty() || self.index == 0 {
            return HistoryStep::Unchanged;
        }
        self.index -= 1;
        HistoryStep::Entry(self.entries[self.index].clone())
    }

    pub fn next(&mut self) -> HistoryStep {
        if self.index >= self.entries.len() {
            return HistoryStep::Unchanged;
        }
        self.index += 1;
        match self.entries.get(self.index) {
            Some(entry) => HistoryStep::Entry(entry.clone()),
            None => HistoryStep::Cleared,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
