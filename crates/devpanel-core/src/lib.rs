//! Log buffer and filter engine for devpanel
//!
//! This crate provides the bounded log buffer, argument sanitization,
//! filtering, sink fan-out, capture of host logging, and best-effort
//! persistence.

mod buffer;
mod capture;
mod console;
mod filter;
pub mod sanitize;
mod sink;
mod store;

pub use buffer::{KindCounts, LogBuffer};
pub use capture::CaptureLayer;
pub use console::{ConsoleOptions, DevConsole, MIN_LOG_HISTORY};
pub use filter::FilterState;
pub use sink::{ConsoleSink, LogSink, StoreSink, MIRROR_TARGET};
pub use store::{LogStore, StoreError};

// Re-export types used in our public API
pub use devpanel_types::{ErrorRecord, LogEntry, LogKind, LogValue, MinLevel};
