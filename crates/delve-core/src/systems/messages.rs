//! Bounded message log - the sink for human-readable game events.
//!
//! Holds at most `capacity` lines; adding past capacity evicts the oldest.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.lines.push_back(message.into());
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Oldest first
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_insertion_order() {
        let mut log = MessageLog::new(3);
        log.add("one");
        log.add("two");
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["one", "two"]);
        assert_eq!(log.last(), Some("two"));
    }

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let mut log = MessageLog::new(3);
        for i in 0..5 {
            log.add(format!("line {}", i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_zero_capacity_still_keeps_latest() {
        let mut log = MessageLog::new(0);
        log.add("a");
        log.add("b");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["b"]);
    }
}
