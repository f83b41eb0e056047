//! Shared types for devpanel
//!
//! This crate contains data structures used across multiple devpanel crates.

use chrono::{DateTime, Utc};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

// ============================================================================
// Severity Types
// ============================================================================

/// Log severity kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    #[default]
    Log,
    Info,
    Warn,
    Error,
}

impl LogKind {
    /// All kinds in ascending severity order
    pub const ALL: [LogKind; 4] = [Self::Log, Self::Info, Self::Warn, Self::Error];

    /// Parse a kind from common formats
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "log" | "debug" | "trace" => Some(Self::Log),
            "info" | "information" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" | "err" => Some(Self::Error),
            _ => None,
        }
    }

    /// Get display color for this kind
    pub fn color(&self) -> Color {
        match self {
            Self::Log => Color::DarkGray,
            Self::Info => Color::Green,
            Self::Warn => Color::Yellow,
            Self::Error => Color::Red,
        }
    }

    /// Short display string (4 chars)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "LOG ",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERR ",
        }
    }
}

/// Minimum severity used to pre-seed the panel's kind filter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinLevel {
    #[default]
    Info,
    Warn,
    Error,
}

impl MinLevel {
    /// The lowest kind this minimum admits
    pub fn floor(&self) -> LogKind {
        match self {
            Self::Info => LogKind::Info,
            Self::Warn => LogKind::Warn,
            Self::Error => LogKind::Error,
        }
    }
}

// ============================================================================
// Value Types
// ============================================================================

/// Normalized form of an error argument
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub name: String,
    pub message: String,
    /// Chain of `source()` causes, outermost first
    #[serde(default)]
    pub chain: Vec<String>,
}

impl ErrorRecord {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            chain: Vec::new(),
        }
    }
}

/// One sanitized log argument
///
/// Produced by the sanitizer in devpanel-core; entries never hold references
/// into caller data, so later mutation of the original cannot change what
/// was recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum LogValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Error(ErrorRecord),
    Record(serde_json::Value),
}

impl LogValue {
    /// Stringified form used for search and rendering
    pub fn display(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Error(e) => {
                if e.chain.is_empty() {
                    format!("{}: {}", e.name, e.message)
                } else {
                    format!("{}: {} (caused by: {})", e.name, e.message, e.chain.join(" <- "))
                }
            }
            Self::Record(v) => serde_json::to_string(v).unwrap_or_else(|_| "{}".to_string()),
        }
    }
}

// ============================================================================
// Log Entry
// ============================================================================

/// A single captured log entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique sequential ID
    pub id: u64,

    /// Severity kind
    pub kind: LogKind,

    /// Sanitized arguments, in call order
    pub content: Vec<LogValue>,

    /// Creation time, non-decreasing with insertion order
    pub timestamp: DateTime<Utc>,

    /// Free-form labels; insertion order preserved for display
    #[serde(default)]
    pub tags: Vec<String>,
}

impl LogEntry {
    /// Create a new entry with minimal fields
    pub fn new(kind: LogKind, content: Vec<LogValue>) -> Self {
        Self {
            id: 0,
            kind,
            content,
            timestamp: Utc::now(),
            tags: Vec::new(),
        }
    }

    /// Attach tags to the entry
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Joined stringified content
    pub fn message(&self) -> String {
        self.content
            .iter()
            .map(|v| v.display())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the entry carries every one of the given tags
    pub fn has_all_tags<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter()
            .all(|t| self.tags.iter().any(|own| own == t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ordering() {
        assert!(LogKind::Log < LogKind::Info);
        assert!(LogKind::Info < LogKind::Warn);
        assert!(LogKind::Warn < LogKind::Error);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(LogKind::parse("warn"), Some(LogKind::Warn));
        assert_eq!(LogKind::parse("WARNING"), Some(LogKind::Warn));
        assert_eq!(LogKind::parse("nope"), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(LogValue::Null.display(), "null");
        assert_eq!(LogValue::Text("hi".into()).display(), "hi");
        let err = LogValue::Error(ErrorRecord::new("IoError", "file missing"));
        assert_eq!(err.display(), "IoError: file missing");
    }

    #[test]
    fn test_entry_message() {
        let entry = LogEntry::new(
            LogKind::Info,
            vec![LogValue::Text("count".into()), LogValue::Number(3.0)],
        );
        assert_eq!(entry.message(), "count 3");
    }

    #[test]
    fn test_has_all_tags() {
        let entry = LogEntry::new(LogKind::Log, vec![]).with_tags(vec![
            "auth".to_string(),
            "api".to_string(),
        ]);
        assert!(entry.has_all_tags(["auth"]));
        assert!(entry.has_all_tags(["auth", "api"]));
        assert!(!entry.has_all_tags(["auth", "db"]));
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let entry = LogEntry::new(
            LogKind::Error,
            vec![LogValue::Error(ErrorRecord::new("Error", "boom"))],
        )
        .with_tags(vec!["auth".to_string()]);
        let json = serde_json::to_string(&entry).unwrap();
        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
