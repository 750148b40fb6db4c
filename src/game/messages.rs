//! # Message Log
//!
//! Rolling log of user-visible events, newest first.

use crate::config::MESSAGE_LOG_CAPACITY;
use std::collections::VecDeque;

/// Bounded message log. Only the most recent entries are kept.
///
/// # Examples
///
/// ```
/// use delve::MessageLog;
///
/// let mut log = MessageLog::new();
/// log.push("first");
/// log.push("second");
/// assert_eq!(log.latest(), Some("second"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::with_capacity(MESSAGE_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Rebuilds a log from saved lines (newest first), dropping any overflow.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut log = Self::new();
        log.entries.extend(lines);
        log.entries.truncate(log.capacity);
        log
    }

    /// Adds a message in front and drops the oldest beyond capacity.
    pub fn push(&mut self, text: impl Into<String>) {
        self.entries.push_front(text.into());
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    /// Messages newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_events_keep_five_newest_first() {
        let mut log = MessageLog::new();
        for n in 1..=6 {
            log.push(format!("event {}", n));
        }

        assert_eq!(
            log.to_vec(),
            vec!["event 6", "event 5", "event 4", "event 3", "event 2"]
        );
    }

    #[test]
    fn test_from_lines_truncates() {
        let lines = (0..8).map(|n| n.to_string()).collect();
        let log = MessageLog::from_lines(lines);
        assert_eq!(log.len(), MESSAGE_LOG_CAPACITY);
        assert_eq!(log.latest(), Some("0"));
    }
}
