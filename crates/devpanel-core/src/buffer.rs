use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use devpanel_types::{LogEntry, LogKind, LogValue};

/// Thread-safe ring buffer for log entries
///
/// Entries are kept oldest-first; when the buffer is at capacity the oldest
/// entry is evicted before the new one is appended.
#[derive(Clone)]
pub struct LogBuffer {
    /// Internal storage
    entries: Arc<RwLock<VecDeque<LogEntry>>>,

    /// Maximum capacity
    capacity: usize,

    /// Next entry ID
    next_id: Arc<AtomicU64>,
}

impl LogBuffer {
    /// Create a new log buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Maximum number of entries retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a new entry, evicting the oldest if at capacity
    ///
    /// Assigns the entry's sequential id and clamps its timestamp so that
    /// timestamps never decrease in insertion order. Returns the stored
    /// entry for fan-out to sinks and hooks.
    pub fn push(&self, mut entry: LogEntry) -> LogEntry {
        entry.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.write();
        if let Some(last) = entries.back() {
            if entry.timestamp < last.timestamp {
                entry.timestamp = last.timestamp;
            }
        }
        // A zero-capacity buffer retains nothing
        if self.capacity == 0 {
            return entry;
        }
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        entry
    }

    /// Build and push an entry in one step
    pub fn push_new(&self, kind: LogKind, content: Vec<LogValue>, tags: Vec<String>) -> LogEntry {
        self.push(LogEntry::new(kind, content).with_tags(tags))
    }

    /// Get all entries (cloned for rendering)
    pub fn all(&self) -> Vec<LogEntry> {
        self.entries.read().iter().cloned().collect()
    }

    /// Get entries filtered by a predicate
    pub fn filtered<F>(&self, predicate: F) -> Vec<LogEntry>
    where
        F: Fn(&LogEntry) -> bool,
    {
        self.entries
            .read()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// Get entry count per severity kind
    pub fn kind_counts(&self) -> KindCounts {
        let entries = self.entries.read();
        let mut counts = KindCounts::default();

        for entry in entries.iter() {
            match entry.kind {
                LogKind::Log => counts.log += 1,
                LogKind::Info => counts.info += 1,
                LogKind::Warn => counts.warn += 1,
                LogKind::Error => counts.error += 1,
            }
        }

        counts
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Export all entries as rendered lines
    pub fn export_text(&self) -> String {
        self.entries
            .read()
            .iter()
            .map(|e| {
                format!(
                    "{} [{}] {}",
                    e.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                    e.kind.as_str().trim_end(),
                    e.message()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clear all entries; idempotent
    pub fn clear(&self) {
        self.entries.write().clear();
        self.next_id.store(0, Ordering::SeqCst);
    }

    /// Get the last N entries
    pub fn tail(&self, n: usize) -> Vec<LogEntry> {
        let entries = self.entries.read();
        let start = entries.len().saturating_sub(n);
        entries.iter().skip(start).cloned().collect()
    }
}

/// Counts per severity kind
#[derive(Clone, Debug, Default)]
pub struct KindCounts {
    pub log: usize,
    pub info: usize,
    pub warn: usize,
    pub error: usize,
}

impl KindCounts {
    pub fn total(&self) -> usize {
        self.log + self.info + self.warn + self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn text_entry(kind: LogKind, msg: &str) -> LogEntry {
        LogEntry::new(kind, vec![LogValue::Text(msg.to_string())])
    }

    #[test]
    fn test_bounded_growth() {
        let buffer = LogBuffer::new(5);
        for i in 0..12 {
            buffer.push(text_entry(LogKind::Log, &format!("msg {}", i)));
        }
        assert_eq!(buffer.len(), 5);
        let messages: Vec<_> = buffer.all().iter().map(|e| e.message()).collect();
        assert_eq!(messages, vec!["msg 7", "msg 8", "msg 9", "msg 10", "msg 11"]);
    }

    #[test]
    fn test_under_capacity_keeps_everything() {
        let buffer = LogBuffer::new(100);
        for i in 0..3 {
            buffer.push(text_entry(LogKind::Info, &format!("msg {}", i)));
        }
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_capacity_two_scenario() {
        let buffer = LogBuffer::new(2);
        buffer.push(text_entry(LogKind::Log, "Log 1"));
        buffer.push(text_entry(LogKind::Log, "Log 2"));
        buffer.push(text_entry(LogKind::Log, "Log 3"));
        let messages: Vec<_> = buffer.all().iter().map(|e| e.message()).collect();
        assert_eq!(messages, vec!["Log 2", "Log 3"]);
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let buffer = LogBuffer::new(0);
        buffer.push(text_entry(LogKind::Log, "x"));
        buffer.push(text_entry(LogKind::Log, "y"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_idempotent() {
        let buffer = LogBuffer::new(10);
        buffer.push(text_entry(LogKind::Warn, "about to vanish"));
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_monotonic_timestamps() {
        let buffer = LogBuffer::new(10);
        // An entry stamped in the future forces the clamp on the next push
        let mut future = text_entry(LogKind::Log, "future");
        future.timestamp = Utc::now() + Duration::seconds(60);
        buffer.push(future);
        buffer.push(text_entry(LogKind::Log, "now"));

        let entries = buffer.all();
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn test_kind_counts() {
        let buffer = LogBuffer::new(10);
        buffer.push(text_entry(LogKind::Info, "a"));
        buffer.push(text_entry(LogKind::Error, "b"));
        buffer.push(text_entry(LogKind::Error, "c"));
        let counts = buffer.kind_counts();
        assert_eq!(counts.info, 1);
        assert_eq!(counts.error, 2);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_tail() {
        let buffer = LogBuffer::new(10);
        for i in 0..6 {
            buffer.push(text_entry(LogKind::Log, &format!("msg {}", i)));
        }
        let tail: Vec<_> = buffer.tail(2).iter().map(|e| e.message()).collect();
        assert_eq!(tail, vec!["msg 4", "msg 5"]);
    }

    #[test]
    fn test_ids_are_sequential() {
        let buffer = LogBuffer::new(3);
        for _ in 0..5 {
            buffer.push(text_entry(LogKind::Log, "x"));
        }
        let ids: Vec<_> = buffer.all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }
}
