//! Best-effort persistence for captured log entries
//!
//! Entries are kept as a single JSON document under a well-known path. Every
//! read failure degrades to an empty store; write failures surface as
//! [`StoreError`] and are contained by the store sink, never by `append`.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use devpanel_types::LogEntry;

/// Current on-disk schema version; files with any other version are discarded
const STORE_VERSION: u32 = 1;

/// Persistence failure, contained inside the store sink
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("log store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("log store serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: Vec<LogEntry>,
}

/// Handle to the on-disk log history
#[derive(Clone, Debug)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    /// Create a store at an explicit path
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a store at the default location under the home directory
    pub fn default_location() -> Option<Self> {
        Self::default_path().map(Self::at)
    }

    /// The default store file path
    pub fn default_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(".devpanel").join("log-history.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load persisted entries; empty on any failure or version mismatch
    pub fn load(&self) -> Vec<LogEntry> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str::<StoreFile>(&content).ok())
            .filter(|file| file.version == STORE_VERSION)
            .map(|file| file.entries)
            .unwrap_or_default()
    }

    /// Replace the persisted history with the given entries
    pub fn save(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = StoreFile {
            version: STORE_VERSION,
            entries: entries.to_vec(),
        };
        let content = serde_json::to_string(&file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Append one entry, trimming the persisted history to the given bound
    ///
    /// The on-disk history obeys the same FIFO bound as the in-memory
    /// buffer; the oldest persisted entries are dropped first.
    pub fn append(&self, entry: &LogEntry, max_history: usize) -> Result<(), StoreError> {
        let mut entries = self.load();
        entries.push(entry.clone());
        if entries.len() > max_history {
            let excess = entries.len() - max_history;
            entries.drain(..excess);
        }
        self.save(&entries)
    }

    /// Remove the persisted history
    pub fn wipe(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devpanel_types::{LogKind, LogValue};

    fn temp_store(name: &str) -> LogStore {
        let path = std::env::temp_dir().join(format!("devpanel-store-{name}-{}.json", std::process::id()));
        let store = LogStore::at(path);
        let _ = store.wipe();
        store
    }

    fn text_entry(msg: &str) -> LogEntry {
        LogEntry::new(LogKind::Info, vec![LogValue::Text(msg.to_string())])
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let store = temp_store("missing");
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = temp_store("roundtrip");
        let entries = vec![text_entry("one"), text_entry("two")];
        store.save(&entries).unwrap();
        assert_eq!(store.load(), entries);
        store.wipe().unwrap();
    }

    #[test]
    fn test_append_accumulates() {
        let store = temp_store("append");
        store.append(&text_entry("first"), 10).unwrap();
        store.append(&text_entry("second"), 10).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].message(), "second");
        store.wipe().unwrap();
    }

    #[test]
    fn test_append_trims_oldest_to_bound() {
        let store = temp_store("bounded");
        for i in 0..7 {
            store.append(&text_entry(&format!("entry {i}")), 3).unwrap();
        }
        let loaded = store.load();
        assert_eq!(loaded.len(), 3);
        let messages: Vec<_> = loaded.iter().map(|e| e.message()).collect();
        assert_eq!(messages, vec!["entry 4", "entry 5", "entry 6"]);
        store.wipe().unwrap();
    }

    #[test]
    fn test_version_mismatch_discards_entries() {
        let store = temp_store("version");
        let content = serde_json::json!({ "version": 99, "entries": [] });
        fs::write(store.path(), content.to_string()).unwrap();
        assert!(store.load().is_empty());
        store.wipe().unwrap();
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let store = temp_store("corrupt");
        fs::write(store.path(), "not json at all").unwrap();
        assert!(store.load().is_empty());
        store.wipe().unwrap();
    }
}
