//! Sink abstraction for appended entries
//!
//! Console patching is re-expressed as a registry of sinks: every appended
//! entry fans out to the registered sinks after it lands in the buffer. The
//! real console and the persistence store are both ordinary sinks.

use std::sync::atomic::{AtomicBool, Ordering};

use devpanel_types::{LogEntry, LogKind};

use crate::store::LogStore;

/// Target prefix for the engine's own tracing output
///
/// The capture layer skips events under this target so that mirroring an
/// entry to the real console can never capture it back.
pub const MIRROR_TARGET: &str = "devpanel::mirror";

/// A destination that receives every appended entry
pub trait LogSink: Send + Sync {
    /// Registry name; registering a sink with an existing name replaces it
    fn name(&self) -> &str;

    /// Receive one entry. Must not fail; failures are the sink's to contain.
    fn emit(&self, entry: &LogEntry);
}

/// Mirrors entries to the real logging backend with a fixed prefix
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn emit(&self, entry: &LogEntry) {
        let message = entry.message();
        match entry.kind {
            LogKind::Log => tracing::debug!(target: MIRROR_TARGET, "[devpanel] {message}"),
            LogKind::Info => tracing::info!(target: MIRROR_TARGET, "[devpanel] {message}"),
            LogKind::Warn => tracing::warn!(target: MIRROR_TARGET, "[devpanel] {message}"),
            LogKind::Error => tracing::error!(target: MIRROR_TARGET, "[devpanel] {message}"),
        }
    }
}

/// Persists entries to the on-disk log history
///
/// The persisted history is trimmed to the same bound as the in-memory
/// buffer. A failing store is reported once through the lowest-severity
/// channel and never propagates to the caller of `append`.
pub struct StoreSink {
    store: LogStore,
    capacity: usize,
    reported: AtomicBool,
}

impl StoreSink {
    pub fn new(store: LogStore, capacity: usize) -> Self {
        Self {
            store,
            capacity,
            reported: AtomicBool::new(false),
        }
    }
}

impl LogSink for StoreSink {
    fn name(&self) -> &str {
        "store"
    }

    fn emit(&self, entry: &LogEntry) {
        if let Err(e) = self.store.append(entry, self.capacity) {
            if !self.reported.swap(true, Ordering::Relaxed) {
                tracing::debug!(target: "devpanel::store", "log persistence failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devpanel_types::LogValue;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct RecordingSink {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl LogSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        fn emit(&self, entry: &LogEntry) {
            self.seen.lock().push(entry.message());
        }
    }

    #[test]
    fn test_store_sink_contains_failures() {
        // A directory path as the store file makes every write fail
        let store = LogStore::at(std::env::temp_dir());
        let sink = StoreSink::new(store, 10);
        let entry = LogEntry::new(LogKind::Info, vec![LogValue::Text("x".to_string())]);
        sink.emit(&entry);
        sink.emit(&entry);
        assert!(sink.reported.load(Ordering::Relaxed));
    }

    #[test]
    fn test_recording_sink_sees_entries() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink { seen: seen.clone() };
        let entry = LogEntry::new(LogKind::Warn, vec![LogValue::Text("hello".to_string())]);
        sink.emit(&entry);
        assert_eq!(*seen.lock(), vec!["hello".to_string()]);
    }
}
