//! The per-instance console context
//!
//! A [`DevConsole`] owns one bounded buffer, a sink registry, and the
//! intercept flag. It is factory-constructed; there is no process-wide
//! shared buffer, so two mounted panels cannot leak entries into each
//! other. Cloning a handle shares the same underlying state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use devpanel_types::{LogEntry, LogKind, LogValue};

use crate::buffer::{KindCounts, LogBuffer};
use crate::capture::CaptureLayer;
use crate::filter::FilterState;
use crate::sink::{ConsoleSink, LogSink, StoreSink};
use crate::store::LogStore;

/// Re-entrancy guard for the append fan-out
///
/// Forwarding an entry to the console sink raises a tracing event that the
/// capture layer would otherwise feed straight back into `append`. The
/// guard is held across the fan-out; a nested append observing it is
/// dropped instead of recursing. Thread-local because the scheduling model
/// is call-order on the appending thread.
pub(crate) mod guard {
    use std::cell::Cell;

    thread_local! {
        static ACTIVE: Cell<bool> = const { Cell::new(false) };
    }

    pub fn is_active() -> bool {
        ACTIVE.with(|a| a.get())
    }

    pub struct FanOutGuard;

    pub fn enter() -> FanOutGuard {
        ACTIVE.with(|a| a.set(true));
        FanOutGuard
    }

    impl Drop for FanOutGuard {
        fn drop(&mut self) {
            ACTIVE.with(|a| a.set(false));
        }
    }
}

/// Smallest usable history bound; lower requested values are raised to it
pub const MIN_LOG_HISTORY: usize = 10;

/// Construction options for a console context
#[derive(Clone, Debug)]
pub struct ConsoleOptions {
    /// Maximum retained entries; values below [`MIN_LOG_HISTORY`] are
    /// raised to that floor
    pub max_log_history: usize,

    /// Mirror appended entries to the real logging backend
    pub forward_to_console: bool,

    /// Persist appended entries to this store
    pub store: Option<LogStore>,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            max_log_history: 1000,
            forward_to_console: false,
            store: None,
        }
    }
}

type EntryHook = Arc<dyn Fn(&LogEntry) + Send + Sync>;

struct ConsoleInner {
    buffer: LogBuffer,
    sinks: RwLock<Vec<Arc<dyn LogSink>>>,
    hooks: RwLock<Vec<EntryHook>>,
    intercepting: AtomicBool,
    store: Option<LogStore>,
}

/// Handle to one console instance
#[derive(Clone)]
pub struct DevConsole {
    inner: Arc<ConsoleInner>,
}

impl DevConsole {
    /// Create a fresh console context
    ///
    /// The history bound is clamped to [`MIN_LOG_HISTORY`]; rejecting an
    /// out-of-range configured value with an error is the mount layer's
    /// job.
    pub fn new(options: ConsoleOptions) -> Self {
        let capacity = options.max_log_history.max(MIN_LOG_HISTORY);

        let mut sinks: Vec<Arc<dyn LogSink>> = Vec::new();
        if options.forward_to_console {
            sinks.push(Arc::new(ConsoleSink));
        }
        if let Some(store) = &options.store {
            sinks.push(Arc::new(StoreSink::new(store.clone(), capacity)));
        }

        Self {
            inner: Arc::new(ConsoleInner {
                buffer: LogBuffer::new(capacity),
                sinks: RwLock::new(sinks),
                hooks: RwLock::new(Vec::new()),
                intercepting: AtomicBool::new(false),
                store: options.store,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Appending
    // ------------------------------------------------------------------

    /// Append a sanitized entry and fan it out to hooks and sinks
    ///
    /// Infallible: sink and store failures are contained downstream. A call
    /// arriving while a fan-out is already in progress on this thread is
    /// dropped (see [`guard`]). The registries are snapshotted before the
    /// fan-out, so a hook may register hooks or sinks without deadlocking.
    pub fn append(&self, kind: LogKind, content: Vec<LogValue>, tags: Vec<String>) {
        if guard::is_active() {
            return;
        }

        let entry = self.inner.buffer.push_new(kind, content, tags);

        let hooks = self.inner.hooks.read().clone();
        let sinks = self.inner.sinks.read().clone();

        let _guard = guard::enter();
        for hook in &hooks {
            hook(&entry);
        }
        for sink in &sinks {
            sink.emit(&entry);
        }
    }

    pub fn log(&self, content: Vec<LogValue>) {
        self.append(LogKind::Log, content, Vec::new());
    }

    pub fn info(&self, content: Vec<LogValue>) {
        self.append(LogKind::Info, content, Vec::new());
    }

    pub fn warn(&self, content: Vec<LogValue>) {
        self.append(LogKind::Warn, content, Vec::new());
    }

    pub fn error(&self, content: Vec<LogValue>) {
        self.append(LogKind::Error, content, Vec::new());
    }

    /// Append with tags attached
    pub fn tagged(&self, kind: LogKind, content: Vec<LogValue>, tags: Vec<String>) {
        self.append(kind, content, tags);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Filtered snapshot of the buffer, in insertion order
    pub fn filter(&self, state: &FilterState) -> Vec<LogEntry> {
        self.inner.buffer.filtered(|e| state.matches(e))
    }

    pub fn all(&self) -> Vec<LogEntry> {
        self.inner.buffer.all()
    }

    pub fn len(&self) -> usize {
        self.inner.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.buffer.is_empty()
    }

    pub fn kind_counts(&self) -> KindCounts {
        self.inner.buffer.kind_counts()
    }

    /// All distinct tags currently in the buffer, in first-seen order
    pub fn known_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for entry in self.inner.buffer.all() {
            for tag in entry.tags {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        tags
    }

    pub fn export_text(&self) -> String {
        self.inner.buffer.export_text()
    }

    /// Empty the buffer; idempotent
    pub fn clear(&self) {
        self.inner.buffer.clear();
    }

    // ------------------------------------------------------------------
    // Interception
    // ------------------------------------------------------------------

    /// A capture layer bound to this context, for the host's subscriber
    pub fn capture_layer(&self) -> CaptureLayer {
        CaptureLayer::new(self.clone())
    }

    /// Start feeding captured host logging into the buffer
    ///
    /// Idempotent: a second call leaves the already-set flag alone; there
    /// is nothing to double-wrap because capture is a flag check, not a
    /// function replacement.
    pub fn intercept(&self) {
        self.inner.intercepting.store(true, Ordering::SeqCst);
    }

    /// Stop capturing; no-op when not intercepting
    pub fn restore(&self) {
        self.inner.intercepting.store(false, Ordering::SeqCst);
    }

    pub fn is_intercepting(&self) -> bool {
        self.inner.intercepting.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Sinks and hooks
    // ------------------------------------------------------------------

    /// Register a sink; a sink with the same name is replaced
    pub fn register_sink(&self, sink: Box<dyn LogSink>) {
        let sink: Arc<dyn LogSink> = Arc::from(sink);
        let mut sinks = self.inner.sinks.write();
        sinks.retain(|s| s.name() != sink.name());
        sinks.push(sink);
    }

    /// Remove a sink by name; no-op when absent
    pub fn unregister_sink(&self, name: &str) {
        self.inner.sinks.write().retain(|s| s.name() != name);
    }

    /// Register a per-entry hook, invoked once per appended entry
    pub fn on_entry<F>(&self, hook: F)
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        self.inner.hooks.write().push(Arc::new(hook));
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the whole buffer to the store, replacing previous history
    ///
    /// Best-effort: a failing store is reported on the lowest-severity
    /// channel only.
    pub fn flush_to_store(&self) {
        let Some(store) = &self.inner.store else {
            return;
        };
        if let Err(e) = store.save(&self.inner.buffer.all()) {
            tracing::debug!(target: "devpanel::store", "final flush failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;
    use parking_lot::Mutex;

    fn console(capacity: usize) -> DevConsole {
        DevConsole::new(ConsoleOptions {
            max_log_history: capacity,
            forward_to_console: false,
            store: None,
        })
    }

    #[test]
    fn test_append_and_filter_by_kind() {
        let console = console(100);
        console.info(values!["Info message"]);
        console.error(values!["Error message"]);
        console.warn(values!["Warning message"]);

        let errors = console.filter(&FilterState::new().with_kinds([LogKind::Error]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Error message");
    }

    #[test]
    fn test_tagged_filter_scenario() {
        let console = console(100);
        console.info(values!["one"]);
        console.error(values!["two"]);
        console.warn(values!["three"]);
        console.tagged(
            LogKind::Log,
            values!["four"],
            vec!["auth".to_string(), "api".to_string()],
        );
        console.tagged(LogKind::Log, values!["five"], vec!["auth".to_string()]);

        let matched = console.filter(&FilterState::new().with_tags(["auth", "api"]));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].message(), "four");
    }

    #[test]
    fn test_clear_is_idempotent_and_observable() {
        let console = console(10);
        console.log(values!["x"]);
        console.clear();
        assert!(console.is_empty());
        console.clear();
        assert!(console.is_empty());
    }

    #[test]
    fn test_intercept_flag_round_trip() {
        let console = console(10);
        assert!(!console.is_intercepting());

        console.intercept();
        console.intercept();
        assert!(console.is_intercepting());

        console.restore();
        assert!(!console.is_intercepting());

        // Restore when not intercepting is a no-op
        console.restore();
        assert!(!console.is_intercepting());
    }

    #[test]
    fn test_on_entry_hook_runs_per_append() {
        let console = console(10);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        console.on_entry(move |entry| {
            seen_clone.lock().push(entry.message());
        });

        console.info(values!["first"]);
        console.warn(values!["second"]);
        assert_eq!(*seen.lock(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_nested_append_from_hook_is_dropped() {
        let console = console(10);
        let handle = console.clone();
        console.on_entry(move |_entry| {
            // Re-enters append during fan-out; must be dropped, not recurse
            handle.error(values!["nested"]);
        });

        console.info(values!["outer"]);
        assert_eq!(console.len(), 1);
        assert_eq!(console.all()[0].message(), "outer");
    }

    #[test]
    fn test_sink_registration_by_name() {
        let console = console(10);
        let seen = Arc::new(Mutex::new(Vec::new()));

        struct Named {
            seen: Arc<Mutex<Vec<String>>>,
            label: &'static str,
        }
        impl LogSink for Named {
            fn name(&self) -> &str {
                "shipper"
            }
            fn emit(&self, entry: &LogEntry) {
                self.seen.lock().push(format!("{}:{}", self.label, entry.message()));
            }
        }

        console.register_sink(Box::new(Named { seen: seen.clone(), label: "a" }));
        // Same name replaces, no double delivery
        console.register_sink(Box::new(Named { seen: seen.clone(), label: "b" }));
        console.log(values!["hello"]);
        assert_eq!(*seen.lock(), vec!["b:hello".to_string()]);

        console.unregister_sink("shipper");
        console.log(values!["again"]);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_known_tags_first_seen_order() {
        let console = console(10);
        console.tagged(LogKind::Log, values!["a"], vec!["api".to_string()]);
        console.tagged(
            LogKind::Log,
            values!["b"],
            vec!["auth".to_string(), "api".to_string()],
        );
        assert_eq!(console.known_tags(), vec!["api".to_string(), "auth".to_string()]);
    }

    #[test]
    fn test_eviction_through_console() {
        let console = console(10);
        for i in 1..=12 {
            console.log(values![format!("Log {i}")]);
        }
        let messages: Vec<_> = console.all().iter().map(|e| e.message()).collect();
        assert_eq!(messages.len(), 10);
        assert_eq!(messages[0], "Log 3");
        assert_eq!(messages[9], "Log 12");
    }

    #[test]
    fn test_history_bound_has_a_floor() {
        let console = console(0);
        for i in 0..15 {
            console.log(values![format!("entry {i}")]);
        }
        assert_eq!(console.len(), MIN_LOG_HISTORY);
    }

    #[test]
    fn test_hook_may_register_during_fan_out() {
        let console = console(10);
        let handle = console.clone();
        console.on_entry(move |_entry| {
            handle.on_entry(|_| {});
            handle.register_sink(Box::new(crate::sink::ConsoleSink));
        });

        console.info(values!["first"]);
        console.info(values!["second"]);
        assert_eq!(console.len(), 2);
    }

    #[test]
    fn test_persisted_history_respects_bound() {
        let path = std::env::temp_dir().join(format!(
            "devpanel-console-store-{}.json",
            std::process::id()
        ));
        let store = LogStore::at(path);
        let _ = store.wipe();

        let console = DevConsole::new(ConsoleOptions {
            max_log_history: 10,
            forward_to_console: false,
            store: Some(store.clone()),
        });
        for i in 0..25 {
            console.log(values![format!("entry {i}")]);
        }

        assert_eq!(console.len(), 10);
        assert!(store.load().len() <= 10);
        let _ = store.wipe();
    }
}
