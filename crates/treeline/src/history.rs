//! Bounded command history with Up/Down recall.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
    /// Index of the recalled entry, `None` while not browsing.
    cursor: Option<usize>,
    /// Line that was being edited when browsing started.
    live: String,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// A capacity of zero keeps no entries at all.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            cursor: None,
            live: String::new(),
        }
    }

    /// Append an entry, evicting the oldest one at capacity.
    pub fn push(&mut self, entry: String) {
        self.reset_cursor();
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Step to the next older entry. `live` is the current buffer, kept
    /// so that stepping past the newest entry restores it.
    pub fn older(&mut self, live: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => {
                self.live = live.to_string();
                self.entries.len() - 1
            }
            Some(0) => 0,
            Some(index) => index - 1,
        };
        self.cursor = Some(index);
        self.entries.get(index).cloned()
    }

    /// Step to the next newer entry, or back to the live line.
    pub fn newer(&mut self) -> Option<String> {
        let index = self.cursor?;
        if index + 1 < self.entries.len() {
            self.cursor = Some(index + 1);
            return self.entries.get(index + 1).cloned();
        }
        self.cursor = None;
        Some(std::mem::take(&mut self.live))
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
        self.live.clear();
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, count: usize) -> History {
        let mut history = History::new(capacity);
        for index in 0..count {
            history.push(format!("cmd {index}"));
        }
        history
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = filled(3, 4);
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["cmd 1", "cmd 2", "cmd 3"]);

        let mut recalled = Vec::new();
        for _ in 0..5 {
            recalled.push(history.older("").unwrap());
        }
        assert!(!recalled.contains(&"cmd 0".to_string()));
        assert_eq!(recalled.last().map(String::as_str), Some("cmd 1"));
    }

    #[test]
    fn up_on_empty_history_does_nothing() {
        let mut history = History::new(5);
        assert_eq!(history.older("typed"), None);
        assert!(!history.is_browsing());
    }

    #[test]
    fn down_returns_to_live_line() {
        let mut history = filled(5, 2);
        assert_eq!(history.older("draft").as_deref(), Some("cmd 1"));
        assert_eq!(history.older("ignored").as_deref(), Some("cmd 0"));
        assert_eq!(history.newer().as_deref(), Some("cmd 1"));
        assert_eq!(history.newer().as_deref(), Some("draft"));
        assert!(!history.is_browsing());
        assert_eq!(history.newer(), None);
    }

    #[test]
    fn push_resets_browsing() {
        let mut history = filled(5, 2);
        history.older("");
        history.push("new".to_string());
        assert!(!history.is_browsing());
        assert_eq!(history.older("").as_deref(), Some("new"));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = filled(0, 3);
        assert!(history.is_empty());
        assert_eq!(history.older(""), None);
    }
}
